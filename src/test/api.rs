#[cfg(test)]
mod tests {
    use reqwest::Client;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::api::{
        eastmoney::{parse_history, parse_market_indices, parse_search},
        fundgz::{self, parse_valuation},
        metals::parse_gold_prices,
        utils::unwrap_jsonp,
    };

    const VALUATION: &str = r#"jsonpgz({"fundcode":"110011","name":"易方达优质精选混合(QDII)","jzrq":"2024-05-09","dwjz":"3.7431","gsz":"3.7712","gszzl":"0.75","gztime":"2024-05-10 14:55"});"#;

    const SEARCH: &str = r#"SuggestData_1715323200000({"ErrCode":0,"ErrMsg":null,"Datas":[{"_id":"110011","CODE":"110011","NAME":"易方达优质精选混合(QDII)","JP":"YFDYZJXHH","CATEGORY":700,"CATEGORYDESC":"基金","STOCKMARKET":"","FundBaseInfo":{"_id":"110011","FCODE":"110011","FTYPE":"QDII","JJGS":"易方达基金","JJJL":"张坤","DWJZ":3.7431,"FSRQ":"2024-05-09"},"ZTJJInfo":[{"TTYPE":"BK0477","TTYPENAME":"白酒"},{"INDUSTRY":"消费"}]}]})"#;

    #[test]
    fn unwrap_jsonp_strips_callback() {
        assert_eq!(unwrap_jsonp("cb({\"a\":1});").unwrap(), "{\"a\":1}");
        assert_eq!(unwrap_jsonp("cb({\"a\":1})").unwrap(), "{\"a\":1}");
        assert_eq!(unwrap_jsonp("jsonpgz();").unwrap(), "");
        assert!(unwrap_jsonp("{\"a\":1}").is_err());
    }

    #[test]
    fn parse_valuation_works() {
        let result = parse_valuation(VALUATION).unwrap();

        assert_eq!(result.code(), "110011");
        assert_eq!(*result.net_value(), dec!(3.7431));
        assert_eq!(*result.estimated_value(), dec!(3.7712));
        assert_eq!(*result.change_rate(), dec!(0.75));
        assert_eq!(result.nav_date().unwrap().to_string(), "2024-05-09");
        assert_eq!(
            result.update_time().unwrap().format("%H:%M").to_string(),
            "14:55"
        );
        assert!(result.is_up());
    }

    #[test]
    fn parse_valuation_rejects_empty_payload() {
        assert!(parse_valuation("jsonpgz();").is_err());
        assert!(parse_valuation("<html>not found</html>").is_err());
    }

    #[test]
    fn parse_search_works() {
        let fund = parse_search(SEARCH).unwrap().unwrap();

        assert_eq!(fund.code(), "110011");
        assert_eq!(fund.fund_type(), "QDII");
        assert_eq!(fund.company().as_deref(), Some("易方达基金"));
        assert_eq!(fund.manager().as_deref(), Some("张坤"));
        assert_eq!(*fund.latest_nav(), Some(dec!(3.7431)));
        assert_eq!(fund.industry_info(), "白酒, 消费");
        assert_eq!(fund.primary_industry(), "白酒");
    }

    #[test]
    fn parse_search_without_results() {
        let text = r#"SuggestData_1({"ErrCode":0,"ErrMsg":null,"Datas":[]})"#;
        assert!(parse_search(text).unwrap().is_none());
    }

    #[test]
    fn parse_search_falls_back_to_category() {
        let text = r#"SuggestData_1({"ErrCode":0,"ErrMsg":null,"Datas":[{"CODE":"000001","NAME":"华夏成长","CATEGORYDESC":"基金","ZTJJInfo":[]}]})"#;
        let fund = parse_search(text).unwrap().unwrap();

        assert_eq!(fund.fund_type(), "基金");
        assert_eq!(fund.industry_info(), "Unknown");
        assert!(fund.latest_nav().is_none());
    }

    #[test]
    fn parse_search_reports_api_error() {
        let text = r#"SuggestData_1({"ErrCode":-1,"ErrMsg":"busy","Datas":[]})"#;
        let err = parse_search(text).unwrap_err();
        assert!(format!("{:#}", err).contains("busy"));
    }

    #[test]
    fn parse_history_is_chronological() {
        let data = json!({
            "Data": {"LSJZList": [
                {"FSRQ": "2024-05-10", "DWJZ": "1.2000", "LJJZ": "2.1", "JZZZL": "1.01"},
                {"FSRQ": "2024-05-09", "DWJZ": "1.1880", "LJJZ": "2.0", "JZZZL": ""},
                {"FSRQ": "2024-05-08", "DWJZ": "", "LJJZ": "", "JZZZL": ""}
            ]},
            "ErrCode": 0,
            "ErrMsg": null,
            "TotalCount": 3
        });

        let points = parse_history(data).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date().to_string(), "2024-05-09");
        assert_eq!(*points[1].value(), dec!(1.2));
    }

    #[test]
    fn parse_market_indices_handles_placeholders() {
        let data = json!({
            "rc": 0,
            "data": {"total": 2, "diff": [
                {"f2": 3154.32, "f3": -0.52, "f12": "000001", "f14": "上证指数"},
                {"f2": "-", "f3": "-", "f12": "HSI", "f14": "恒生指数"}
            ]}
        });

        let indices = parse_market_indices(data).unwrap();

        assert_eq!(indices.len(), 2);
        assert_eq!(*indices[0].value(), Some(dec!(3154.32)));
        assert!(!indices[0].is_up());
        assert!(indices[1].value().is_none());
        assert!(!indices[1].is_up());
    }

    #[test]
    fn parse_market_indices_empty_is_error() {
        assert!(parse_market_indices(json!({"rc": 0, "data": null})).is_err());
    }

    #[test]
    fn parse_gold_prices_works() {
        let data = json!({
            "code": 200,
            "msg": "数据请求成功",
            "data": {
                "bank_gold_bar_price": [
                    {"bank": "浦发银行投资金条", "price": "1204.0"},
                    {"bank": "工商银行如意金条", "price": "1196.0"}
                ],
                "gold_recycle_price": [
                    {"gold_type": "黄金回收", "recycle_price": "1106.0", "updated_date": "2026-02-09"}
                ],
                "precious_metal_price": [
                    {"brand": "周大福", "bullion_price": "1367", "gold_price": "1560", "platinum_price": "-", "updated_date": "2026-02-09"}
                ]
            }
        });

        let board = parse_gold_prices(data).unwrap();

        assert_eq!(board.bank_gold_bars().len(), 2);
        assert_eq!(*board.brand_prices()[0].gold_price(), Some(dec!(1560)));
        assert!(board.brand_prices()[0].platinum_price().is_none());
        assert!(!board.stale());

        let reference = board.reference_prices();
        assert_eq!(reference.len(), 2);
        assert_eq!(reference[0].1, dec!(1200));
        assert_eq!(reference[1].1, dec!(1106));
    }

    #[test]
    fn parse_gold_prices_rejects_error_code() {
        let data = json!({"code": 500, "msg": "server error", "data": null});
        assert!(parse_gold_prices(data).is_err());
    }

    #[tokio::test]
    #[ignore = "hits the live valuation endpoint"]
    async fn get_valuation_works() {
        let client = Client::new();
        let result = fundgz::get_valuation("110011", &client).await.unwrap();

        assert_eq!(result.code(), "110011");
    }
}
