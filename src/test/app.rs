#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use crate::{
        app::{
            App,
            schedule::{RefreshSchedule, TradingHours},
        },
        db::{Store, utils::TRACKED_FUNDS},
        services::FundService,
        test::support::valuation,
    };

    async fn app_tracking_one_fund(store: &Store) -> App {
        store
            .write(
                TRACKED_FUNDS,
                &vec![valuation("110011", "Quality Select", dec!(3.7712), dec!(0.75))],
            )
            .await
            .unwrap();

        let mut app = App::load(
            store.clone(),
            FundService::new(Duration::from_secs(1)).unwrap(),
            RefreshSchedule::new(Duration::from_secs(300), TradingHours::default()),
        )
        .await
        .unwrap();
        app.tracker_state.select(Some(0));
        app
    }

    #[tokio::test]
    async fn remove_selected_fund_updates_status() {
        let store = Store::in_memory().await.unwrap();
        let mut app = app_tracking_one_fund(&store).await;

        app.remove_selected_fund().await;

        assert!(app.error_popup.is_none());
        assert_eq!(app.status.as_deref(), Some("Stopped tracking 110011"));
        assert!(!app.tracker.is_tracked("110011"));
    }

    #[tokio::test]
    async fn remove_selected_fund_reports_store_failure() {
        let store = Store::in_memory().await.unwrap();
        let mut app = app_tracking_one_fund(&store).await;
        store.connection().close().await;

        app.remove_selected_fund().await;

        let message = app.error_popup.as_deref().unwrap();
        assert!(message.starts_with("Error removing 110011"));
    }
}
