#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        app::Portfolio,
        db::Store,
        errors::{PortfolioError, ValidationError},
        models::{DEFAULT_WALLET_ID, SUMMARY_WALLET_ID},
        services::batch::{BatchAddItem, batch_add},
        test::support::{StubSource, fund},
    };

    async fn portfolio() -> Portfolio {
        Portfolio::load(Store::in_memory().await.unwrap())
            .await
            .unwrap()
    }

    fn portfolio_error(err: &anyhow::Error) -> Option<&PortfolioError> {
        err.downcast_ref::<PortfolioError>()
    }

    #[tokio::test]
    async fn load_creates_default_wallet() {
        let p = portfolio().await;
        let ids: Vec<String> = p.wallets().iter().map(|w| w.id().clone()).collect();

        assert_eq!(ids, vec![SUMMARY_WALLET_ID, DEFAULT_WALLET_ID]);
    }

    #[tokio::test]
    async fn wallet_lifecycle() {
        let mut p = portfolio().await;
        let wallet = p.create_wallet("  Pension ").unwrap();
        assert_eq!(wallet.name(), "Pension");

        p.rename_wallet(wallet.id(), "Retirement").unwrap();
        assert_eq!(p.wallet(wallet.id()).unwrap().name(), "Retirement");

        p.add_holding(wallet.id(), &fund("110011", "Quality Select", "Consumer"), dec!(100), dec!(0))
            .unwrap();
        p.delete_wallet(wallet.id()).unwrap();

        assert!(p.wallet(wallet.id()).is_none());
        assert!(p.holdings_for(SUMMARY_WALLET_ID).is_empty());
    }

    #[tokio::test]
    async fn wallet_guards() {
        let mut p = portfolio().await;

        let err = p.create_wallet("   ").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyWalletName)
        );

        let err = p.delete_wallet(SUMMARY_WALLET_ID).unwrap_err();
        assert_eq!(portfolio_error(&err), Some(&PortfolioError::SummaryWalletReadOnly));

        let err = p.delete_wallet(DEFAULT_WALLET_ID).unwrap_err();
        assert_eq!(portfolio_error(&err), Some(&PortfolioError::DefaultWalletProtected));

        let err = p.rename_wallet("nope", "Other").unwrap_err();
        assert_eq!(
            portfolio_error(&err),
            Some(&PortfolioError::WalletNotFound("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn holdings_are_unique_per_wallet() {
        let mut p = portfolio().await;
        let f = fund("110011", "Quality Select", "Consumer");
        p.add_holding(DEFAULT_WALLET_ID, &f, dec!(1000), dec!(50)).unwrap();

        let err = p
            .add_holding(DEFAULT_WALLET_ID, &f, dec!(10), dec!(0))
            .unwrap_err();
        assert!(matches!(
            portfolio_error(&err),
            Some(PortfolioError::DuplicateHolding { .. })
        ));

        let other = p.create_wallet("Other").unwrap();
        p.add_holding(other.id(), &f, dec!(10), dec!(0)).unwrap();
        assert!(p.holds(other.id(), "110011"));
    }

    #[tokio::test]
    async fn summary_wallet_aggregates_and_is_read_only() {
        let mut p = portfolio().await;
        let other = p.create_wallet("Other").unwrap();
        let a = fund("110011", "Quality Select", "Consumer");
        let b = fund("161725", "Liquor Index", "Liquor");

        p.add_holding(DEFAULT_WALLET_ID, &a, dec!(1000), dec!(100)).unwrap();
        p.add_holding(other.id(), &a, dec!(500), dec!(-50)).unwrap();
        p.add_holding(other.id(), &b, dec!(500), dec!(0)).unwrap();

        let summary = p.holdings_for(SUMMARY_WALLET_ID);
        assert_eq!(summary.len(), 2);
        let merged = summary.iter().find(|h| h.code() == "110011").unwrap();
        assert_eq!(*merged.holding_amount(), dec!(1500));
        assert_eq!(*merged.holding_profit(), dec!(50));
        assert_eq!(merged.wallet_id(), SUMMARY_WALLET_ID);

        let totals = p.summary_for(SUMMARY_WALLET_ID);
        assert_eq!(*totals.holding_count(), 2);
        assert_eq!(*totals.total_amount(), dec!(2000));

        let err = p
            .add_holding(SUMMARY_WALLET_ID, &b, dec!(1), dec!(0))
            .unwrap_err();
        assert_eq!(portfolio_error(&err), Some(&PortfolioError::SummaryWalletReadOnly));
        assert!(p.batch_delete(SUMMARY_WALLET_ID, &["110011".to_string()]).is_err());
    }

    #[tokio::test]
    async fn edit_and_delete_holdings() {
        let mut p = portfolio().await;
        p.add_holding(DEFAULT_WALLET_ID, &fund("110011", "A", "Tech"), dec!(100), dec!(0))
            .unwrap();
        p.add_holding(DEFAULT_WALLET_ID, &fund("161725", "B", "Tech"), dec!(100), dec!(0))
            .unwrap();
        p.add_holding(DEFAULT_WALLET_ID, &fund("000001", "C", "Tech"), dec!(100), dec!(0))
            .unwrap();

        p.edit_holding(DEFAULT_WALLET_ID, "110011", dec!(250), dec!(-25))
            .unwrap();
        let holdings = p.holdings_for(DEFAULT_WALLET_ID);
        let edited = &holdings[0];
        assert_eq!(*edited.holding_amount(), dec!(250));
        assert_eq!(edited.profit_rate(), dec!(-9.09));

        assert!(
            p.edit_holding(DEFAULT_WALLET_ID, "110011", dec!(-1), dec!(0))
                .is_err()
        );
        assert!(
            p.edit_holding(DEFAULT_WALLET_ID, "222222", dec!(1), dec!(0))
                .is_err()
        );

        p.delete_holding(DEFAULT_WALLET_ID, "000001").unwrap();
        assert!(p.delete_holding(DEFAULT_WALLET_ID, "000001").is_err());

        let removed = p
            .batch_delete(
                DEFAULT_WALLET_ID,
                &["110011".to_string(), "161725".to_string(), "333333".to_string()],
            )
            .unwrap();
        assert_eq!(removed, 2);
        assert!(p.holdings_for(DEFAULT_WALLET_ID).is_empty());
    }

    #[tokio::test]
    async fn add_batch_keeps_successes_only() {
        let mut p = portfolio().await;
        let source = StubSource::with_funds(vec![fund("110011", "Quality Select", "Consumer")]);
        let items = vec![
            BatchAddItem::new("110011".to_string(), dec!(1000), dec!(10)),
            BatchAddItem::new("000000".to_string(), dec!(1000), dec!(10)),
        ];

        let results = batch_add(&source, &items).await;
        let added = p.add_batch(DEFAULT_WALLET_ID, &results).unwrap();

        assert_eq!(added, 1);
        assert!(p.holds(DEFAULT_WALLET_ID, "110011"));
        assert!(!p.holds(DEFAULT_WALLET_ID, "000000"));
    }

    #[tokio::test]
    async fn changes_survive_reload() {
        let store = Store::in_memory().await.unwrap();
        let mut p = Portfolio::load(store.clone()).await.unwrap();
        let wallet = p.create_wallet("Kids").unwrap();
        p.add_holding(wallet.id(), &fund("110011", "A", "Tech"), dec!(100), dec!(5))
            .unwrap();
        p.flush().await;

        store.clear_cache(None);
        let reloaded = Portfolio::load(store).await.unwrap();

        assert!(reloaded.wallet(wallet.id()).is_some());
        assert_eq!(reloaded.holdings_for(wallet.id()).len(), 1);
    }

    #[tokio::test]
    async fn holding_amounts_are_bounded() {
        let mut p = portfolio().await;
        let f = fund("110011", "Quality Select", "Consumer");

        let err = p
            .add_holding(DEFAULT_WALLET_ID, &f, dec!(1000000.01), dec!(0))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::AmountTooLarge { .. })
        ));

        let err = p
            .add_holding(DEFAULT_WALLET_ID, &f, dec!(100), dec!(-1000001))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::ProfitOutOfRange { .. })
        ));
        assert!(!p.holds(DEFAULT_WALLET_ID, "110011"));

        p.add_holding(DEFAULT_WALLET_ID, &f, dec!(1000000), dec!(-1000000))
            .unwrap();
        assert!(
            p.edit_holding(DEFAULT_WALLET_ID, "110011", Decimal::MAX, dec!(0))
                .is_err()
        );
        assert_eq!(p.holdings_for(DEFAULT_WALLET_ID)[0].profit_rate(), dec!(-50));
    }

    #[tokio::test]
    async fn summary_of_large_holdings_does_not_overflow() {
        let mut p = portfolio().await;
        let other = p.create_wallet("Other").unwrap();
        let f = fund("110011", "Quality Select", "Consumer");
        p.add_holding(DEFAULT_WALLET_ID, &f, dec!(1000000), dec!(1000000))
            .unwrap();
        p.add_holding(other.id(), &f, dec!(1000000), dec!(-1000000))
            .unwrap();

        let totals = p.summary_for(SUMMARY_WALLET_ID);

        assert_eq!(*totals.total_amount(), dec!(2000000));
        assert_eq!(*totals.total_profit(), dec!(0));
        assert_eq!(p.holdings_for(DEFAULT_WALLET_ID)[0].profit_rate(), dec!(0));
    }
}
