#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::{Local, TimeZone};
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    use crate::{
        app::{
            Markets,
            markets::{MAX_HISTORY_POINTS, read_macro_csv},
        },
        db::Store,
        models::{
            BankGoldBar, BrandPrice, GoldRecyclePrice, MarketIndex, MetalBoard,
            metal::{SERIES_GOLD_BAR, SERIES_GOLD_RECYCLE, SERIES_PLATINUM},
        },
        test::support::StubSource,
    };

    const MACRO_CSV: &str = "\
date,m1,m1_change_rate,m2,m2_change_rate,gdp,gdp_change_rate,buffett_indicator
2024-02-01,100,1.0,300,0.5,1200,4.8,70
2024-01-01,95,0.8,298,0.4,1200,4.8,69
2024-03-01,110,10.0,305,1.6,1250,5.0,72
";

    fn board(day: u32, bar: rust_decimal::Decimal) -> MetalBoard {
        MetalBoard::new(
            vec![
                BankGoldBar::new("Bank A".to_string(), Some(bar)),
                BankGoldBar::new("Bank B".to_string(), None),
            ],
            vec![GoldRecyclePrice::new(
                "Recycle".to_string(),
                Some(dec!(1106)),
                "2026-02-09".to_string(),
            )],
            vec![BrandPrice::new(
                "Brand".to_string(),
                Some(dec!(1367)),
                Some(dec!(1560)),
                None,
                "2026-02-09".to_string(),
            )],
            Local.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap(),
        )
    }

    fn indices() -> Vec<MarketIndex> {
        vec![
            MarketIndex::new(
                "000001".to_string(),
                "上证指数".to_string(),
                Some(dec!(3154.32)),
                Some(dec!(-0.52)),
            ),
            MarketIndex::new("HSI".to_string(), "恒生指数".to_string(), None, None),
        ]
    }

    fn macro_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", MACRO_CSV).unwrap();
        file
    }

    #[tokio::test]
    async fn record_history_replaces_same_day() {
        let markets = Markets::new(Store::in_memory().await.unwrap());

        markets.record_history(&board(10, dec!(1200))).await.unwrap();
        markets.record_history(&board(10, dec!(1210))).await.unwrap();
        markets.record_history(&board(9, dec!(1190))).await.unwrap();

        let history = markets.metal_history(SERIES_GOLD_BAR).await;
        assert_eq!(history.len(), 2);
        assert_eq!(*history[0].value(), dec!(1190));
        assert_eq!(*history[1].value(), dec!(1210));

        assert_eq!(markets.metal_history(SERIES_GOLD_RECYCLE).await.len(), 2);
        assert!(markets.metal_history(SERIES_PLATINUM).await.is_empty());
    }

    #[tokio::test]
    async fn record_history_is_capped() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        let start = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        for offset in 0..(MAX_HISTORY_POINTS as i64 + 5) {
            let synced = start + chrono::Duration::days(offset);
            let snapshot = MetalBoard::new(
                vec![BankGoldBar::new("Bank".to_string(), Some(dec!(1000)))],
                vec![],
                vec![],
                synced,
            );
            markets.record_history(&snapshot).await.unwrap();
        }

        let history = markets.metal_history(SERIES_GOLD_BAR).await;
        assert_eq!(history.len(), MAX_HISTORY_POINTS);
        assert_eq!(history[0].date().to_string(), "2024-01-06");
    }

    #[tokio::test]
    async fn cached_metals_round_trip_through_store() {
        let store = Store::in_memory().await.unwrap();
        let markets = Markets::new(store.clone());
        assert!(markets.cached_metals().await.is_none());

        let snapshot = board(10, dec!(1200));
        store.write("preciousMetals", &snapshot).await.unwrap();

        let cached = markets.cached_metals().await.unwrap();
        assert_eq!(cached, snapshot);
        assert!(*cached.mark_stale().stale());
    }

    #[test]
    fn read_macro_csv_works() {
        let file = macro_file();
        let rows = read_macro_csv(file.path().to_str().unwrap()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(*rows[0].m1(), dec!(100));
        assert_eq!(*rows[2].buffett_indicator(), dec!(72));
    }

    #[test]
    fn read_macro_csv_rejects_short_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,m1").unwrap();
        writeln!(file, "2024-01-01,100").unwrap();

        assert!(read_macro_csv(file.path().to_str().unwrap()).is_err());
    }

    #[tokio::test]
    async fn import_merges_and_windows() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        let file = macro_file();

        let count = markets
            .import_macro_csv(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(count, 3);

        markets
            .import_macro_csv(file.path().to_str().unwrap())
            .await
            .unwrap();
        let rows = markets.macro_data().await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date().to_string(), "2024-01-01");

        let window = markets.macro_window(1).await;
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].date().to_string(), "2024-02-01");

        let cumulative = markets.macro_cumulative(1).await;
        assert_eq!(*cumulative.last().unwrap().cumulative_change(), dec!(10));
    }

    #[test]
    fn read_macro_csv_without_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2024-01-01,95,0.8,298,0.4,1200,4.8,69").unwrap();
        writeln!(file, "2024-02-01,100,1.0,300,0.5,1200,4.8,70").unwrap();

        let rows = read_macro_csv(file.path().to_str().unwrap()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date().to_string(), "2024-01-01");
    }

    #[tokio::test]
    async fn macro_window_larger_than_data() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        let file = macro_file();
        markets
            .import_macro_csv(file.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(markets.macro_window(usize::MAX).await.len(), 3);
    }

    #[tokio::test]
    async fn refresh_metals_persists_and_records_history() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        let source = StubSource::with_market(board(10, dec!(1200)), vec![]);

        let fresh = markets.refresh_metals(&source).await.unwrap();

        assert!(!fresh.stale());
        assert_eq!(markets.cached_metals().await, Some(fresh));
        assert_eq!(markets.metal_history(SERIES_GOLD_BAR).await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_metals_falls_back_to_stale_snapshot() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        let snapshot = board(10, dec!(1200));
        markets
            .refresh_metals(&StubSource::with_market(snapshot.clone(), vec![]))
            .await
            .unwrap();

        let cached = markets.refresh_metals(&StubSource::default()).await.unwrap();

        assert!(*cached.stale());
        assert_eq!(cached.bank_gold_bars(), snapshot.bank_gold_bars());
        assert_eq!(markets.metal_history(SERIES_GOLD_BAR).await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_metals_without_snapshot_fails() {
        let markets = Markets::new(Store::in_memory().await.unwrap());

        let err = markets
            .refresh_metals(&StubSource::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("unavailable"));
    }

    #[tokio::test]
    async fn refresh_indices_persists() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        let source = StubSource::with_market(board(10, dec!(1200)), indices());

        let fresh = markets.refresh_indices(&source).await.unwrap();

        assert_eq!(fresh, indices());
        assert_eq!(markets.cached_indices().await, indices());
    }

    #[tokio::test]
    async fn refresh_indices_falls_back_to_cached_quotes() {
        let markets = Markets::new(Store::in_memory().await.unwrap());
        markets
            .refresh_indices(&StubSource::with_market(board(10, dec!(1200)), indices()))
            .await
            .unwrap();

        let cached = markets
            .refresh_indices(&StubSource::default())
            .await
            .unwrap();

        assert_eq!(cached, indices());
    }

    #[tokio::test]
    async fn refresh_indices_without_cache_fails() {
        let markets = Markets::new(Store::in_memory().await.unwrap());

        assert!(markets.refresh_indices(&StubSource::default()).await.is_err());
    }
}
