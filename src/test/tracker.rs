#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{
        app::{
            FundTracker,
            tracker::{AddOutcome, filter_valuations, sort_valuations},
        },
        db::Store,
        errors::ValidationError,
        models::{FundSort, SortField, SortOrder},
        test::support::{StubSource, valuation},
    };

    async fn tracker() -> FundTracker {
        FundTracker::load(Store::in_memory().await.unwrap()).await
    }

    fn source() -> StubSource {
        StubSource::with_valuations(vec![
            valuation("110011", "Quality Select", dec!(3.7712), dec!(0.75)),
            valuation("161725", "Liquor Index", dec!(1.0200), dec!(-1.30)),
            valuation("005827", "Blue Chip", dec!(2.1000), dec!(0.10)),
        ])
    }

    #[tokio::test]
    async fn add_codes_accepts_full_width_commas() {
        let mut t = tracker().await;

        let outcome = t
            .add_codes(&source(), "110011，161725, 110011,abc")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            AddOutcome {
                added: vec!["110011".to_string(), "161725".to_string()],
                failed: vec![],
            }
        );
        assert_eq!(t.codes(), vec!["110011", "161725"]);
    }

    #[tokio::test]
    async fn add_codes_reports_partial_failure() {
        let mut t = tracker().await;

        let outcome = t.add_codes(&source(), "110011,222222").await.unwrap();

        assert_eq!(outcome.added, vec!["110011"]);
        assert_eq!(outcome.failed, vec!["222222"]);
        assert!(!t.is_tracked("222222"));
    }

    #[tokio::test]
    async fn add_codes_rejections() {
        let mut t = tracker().await;

        let err = t.add_codes(&source(), "abc, 12345").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NoValidCodes)
        );

        t.add_codes(&source(), "110011").await.unwrap();
        let err = t.add_codes(&source(), "110011").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::AllCodesTracked)
        );

        assert!(t.add_codes(&source(), "222222").await.is_err());
        assert_eq!(t.funds().len(), 1);
    }

    #[tokio::test]
    async fn refresh_keeps_previous_snapshot_on_failure() {
        let mut t = tracker().await;
        t.add_codes(&source(), "110011,161725").await.unwrap();

        let updated = StubSource::with_valuations(vec![valuation(
            "110011",
            "Quality Select",
            dec!(3.8000),
            dec!(1.52),
        )]);
        let failures = t.refresh(&updated).await.unwrap();

        assert_eq!(failures, 1);
        assert_eq!(*t.funds()[0].change_rate(), dec!(1.52));
        assert_eq!(*t.funds()[1].change_rate(), dec!(-1.30));
        assert!(t.last_refresh().is_some());
    }

    #[tokio::test]
    async fn remove_and_reload() {
        let store = Store::in_memory().await.unwrap();
        let mut t = FundTracker::load(store.clone()).await;
        t.add_codes(&source(), "110011,161725").await.unwrap();

        assert!(t.remove("110011").await.unwrap());
        assert!(!t.remove("110011").await.unwrap());

        store.clear_cache(None);
        let reloaded = FundTracker::load(store).await;
        assert_eq!(reloaded.codes(), vec!["161725"]);
    }

    #[tokio::test]
    async fn sorted_and_filtered_views() {
        let mut t = tracker().await;
        t.add_codes(&source(), "110011,161725,005827").await.unwrap();

        let by_change = t.sorted(FundSort::default());
        let codes: Vec<&str> = by_change.iter().map(|f| f.code().as_str()).collect();
        assert_eq!(codes, vec!["110011", "005827", "161725"]);

        let view = t.view(FundSort::new(SortField::Code, SortOrder::Asc), "LIQUOR");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].code(), "161725");
    }

    #[test]
    fn sort_by_name_ascending() {
        let mut funds = vec![
            valuation("000002", "Beta", dec!(1), dec!(0)),
            valuation("000001", "Alpha", dec!(1), dec!(0)),
        ];
        sort_valuations(&mut funds, FundSort::new(SortField::Name, SortOrder::Asc));
        assert_eq!(funds[0].name(), "Alpha");
    }

    #[test]
    fn filter_matches_code_substring() {
        let funds = vec![
            valuation("110011", "Quality Select", dec!(1), dec!(0)),
            valuation("161725", "Liquor Index", dec!(1), dec!(0)),
        ];
        assert_eq!(filter_valuations(&funds, "1100").len(), 1);
        assert_eq!(filter_valuations(&funds, "  ").len(), 2);
    }

    #[test]
    fn sort_toggle() {
        let mut sort = FundSort::default();
        sort.toggle(SortField::ChangeRate);
        assert_eq!(sort.order, SortOrder::Asc);

        sort.toggle(SortField::Name);
        assert_eq!(sort, FundSort::new(SortField::Name, SortOrder::Desc));
    }
}
