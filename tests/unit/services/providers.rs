//! Parser fixtures for each upstream provider

use cyclewatch::errors::FetchError;
use cyclewatch::models::{Metric, MetricKind, MetricValue};
use cyclewatch::services::providers::{
    AlternativeMe, BinanceFutures, BinanceSpot, Bybit, CoinGecko, CoinGlass, CoinPaprika,
    Glassnode, Okx, Provider, ProviderConfig, ProviderRegistry,
};
use serde_json::json;

const BASE: &str = "http://upstream.test";

fn btc_funding() -> Metric {
    Metric::funding_rate("BTCUSDT")
}

fn assert_percent(value: MetricValue, expected: f64) {
    let actual = value.as_percent().expect("percent value");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn coingecko_spot_prices_keep_requested_coins_only() {
    let provider = CoinGecko::new(BASE, None);
    let metric = Metric::spot_prices(["bitcoin", "solana", "osmosis"]);

    let request = provider.build_request(&metric).unwrap();
    assert_eq!(request.url, "http://upstream.test/simple/price");
    assert!(request
        .query
        .contains(&("ids".to_string(), "bitcoin,solana,osmosis".to_string())));
    assert!(request.headers.is_empty());

    let body = json!({
        "bitcoin": {"usd": 64000.5},
        "solana": {"usd": 150.0},
        "dogecoin": {"usd": 0.1}
    });
    let value = provider.parse(&metric, &body).unwrap();
    let prices = value.as_prices().unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices["bitcoin"], 64000.5);
    assert!(!prices.contains_key("osmosis"));
}

#[test]
fn coingecko_sends_demo_key_header_when_configured() {
    let provider = CoinGecko::new(BASE, Some("demo".to_string()));
    let request = provider.build_request(&Metric::BtcDominance).unwrap();
    assert_eq!(
        request.headers,
        vec![("x-cg-demo-api-key".to_string(), "demo".to_string())]
    );
}

#[test]
fn coingecko_history_reads_prices_and_volumes() {
    let provider = CoinGecko::new(BASE, None);
    let metric = Metric::price_history("bitcoin", 30);

    let request = provider.build_request(&metric).unwrap();
    assert_eq!(request.url, "http://upstream.test/coins/bitcoin/market_chart");

    let body = json!({
        "prices": [[1, 100.0], [2, 110.0], [3, 90.0]],
        "total_volumes": [[1, 1000.0], [2, 1000.0], [3, 3000.0]]
    });
    let value = provider.parse(&metric, &body).unwrap();
    let (prices, volumes) = value.as_series().unwrap();
    assert_eq!(prices, &[100.0, 110.0, 90.0]);
    assert_eq!(volumes, &[1000.0, 1000.0, 3000.0]);
}

#[test]
fn coingecko_history_rejects_single_point() {
    let provider = CoinGecko::new(BASE, None);
    let metric = Metric::price_history("bitcoin", 30);
    let body = json!({"prices": [[1, 100.0]], "total_volumes": [[1, 5.0]]});
    assert!(matches!(
        provider.parse(&metric, &body),
        Err(FetchError::Parse { .. })
    ));
}

#[test]
fn coingecko_dominance() {
    let provider = CoinGecko::new(BASE, None);
    let body = json!({"data": {"market_cap_percentage": {"btc": 54.2, "eth": 17.1}}});
    assert_percent(provider.parse(&Metric::BtcDominance, &body).unwrap(), 54.2);

    let err = provider
        .parse(&Metric::BtcDominance, &json!({"data": {}}))
        .unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}

#[test]
fn coingecko_breadth_excludes_bitcoin_and_stablecoins() {
    let provider = CoinGecko::new(BASE, None);
    let metric = Metric::MarketBreadth { top: 50 };
    let body = json!([
        {"id": "bitcoin", "symbol": "btc", "price_change_percentage_24h": 2.0},
        {"id": "ethereum", "symbol": "eth", "price_change_percentage_24h": 1.5},
        {"id": "tether", "symbol": "usdt", "price_change_percentage_24h": 0.01},
        {"id": "solana", "symbol": "sol", "price_change_percentage_24h": -3.0},
        {"id": "ripple", "symbol": "xrp", "price_change_percentage_24h": 0.4},
        {"id": "usd-coin", "symbol": "USDC", "price_change_percentage_24h": 0.02},
        {"id": "mystery", "symbol": "mys", "price_change_percentage_24h": null}
    ]);
    assert_eq!(
        provider.parse(&metric, &body).unwrap(),
        MetricValue::Breadth {
            advancing: 2,
            total: 3
        }
    );
}

#[test]
fn coingecko_does_not_serve_funding() {
    let provider = CoinGecko::new(BASE, None);
    assert!(provider.build_request(&btc_funding()).is_none());
}

#[test]
fn binance_funding_takes_latest_record_as_percent() {
    let provider = BinanceFutures::new(BASE);
    let request = provider.build_request(&btc_funding()).unwrap();
    assert_eq!(request.url, "http://upstream.test/fapi/v1/fundingRate");
    assert!(request
        .query
        .contains(&("symbol".to_string(), "BTCUSDT".to_string())));

    let body = json!([
        {"symbol": "BTCUSDT", "fundingRate": "0.00010000", "fundingTime": 1},
        {"symbol": "BTCUSDT", "fundingRate": "0.00012000", "fundingTime": 2}
    ]);
    assert_percent(provider.parse(&btc_funding(), &body).unwrap(), 0.012);

    assert!(provider.parse(&btc_funding(), &json!([])).is_err());
}

#[test]
fn binance_spot_maps_symbols_back_to_coin_ids() {
    let provider = BinanceSpot::new(BASE);
    let metric = Metric::spot_prices(["bitcoin", "solana", "osmosis"]);

    let request = provider.build_request(&metric).unwrap();
    assert_eq!(
        request.query,
        vec![(
            "symbols".to_string(),
            "[\"BTCUSDT\",\"SOLUSDT\"]".to_string()
        )]
    );

    let body = json!([
        {"symbol": "BTCUSDT", "price": "64000.10"},
        {"symbol": "SOLUSDT", "price": "150.5"}
    ]);
    let value = provider.parse(&metric, &body).unwrap();
    let prices = value.as_prices().unwrap();
    assert_eq!(prices["bitcoin"], 64000.10);
    assert_eq!(prices["solana"], 150.5);
}

#[test]
fn binance_spot_skips_coins_without_a_pair() {
    let provider = BinanceSpot::new(BASE);
    assert!(provider
        .build_request(&Metric::spot_prices(["osmosis"]))
        .is_none());
    assert!(provider
        .build_request(&Metric::price_history("osmosis", 30))
        .is_none());
}

#[test]
fn binance_klines_use_close_and_quote_volume() {
    let provider = BinanceSpot::new(BASE);
    let metric = Metric::price_history("bitcoin", 3);
    let body = json!([
        [0, "1", "1", "1", "100.0", "9", 0, "1000.0", 1, "0", "0", "0"],
        [0, "1", "1", "1", "105.0", "9", 0, "1200.0", 1, "0", "0", "0"],
        [0, "1", "1", "1", "95.0", "9", 0, "2600.0", 1, "0", "0", "0"]
    ]);
    let value = provider.parse(&metric, &body).unwrap();
    let (prices, volumes) = value.as_series().unwrap();
    assert_eq!(prices, &[100.0, 105.0, 95.0]);
    assert_eq!(volumes, &[1000.0, 1200.0, 2600.0]);
}

#[test]
fn bybit_funding_checks_return_code() {
    let provider = Bybit::new(BASE);
    let ok = json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {"list": [{"symbol": "BTCUSDT", "fundingRate": "0.0005"}]}
    });
    assert_percent(provider.parse(&btc_funding(), &ok).unwrap(), 0.05);

    let rejected = json!({"retCode": 10001, "retMsg": "params error", "result": {}});
    let err = provider.parse(&btc_funding(), &rejected).unwrap_err();
    assert!(err.to_string().contains("params error"));
}

#[test]
fn okx_funding_uses_swap_instrument() {
    let provider = Okx::new(BASE);
    let request = provider.build_request(&btc_funding()).unwrap();
    assert_eq!(
        request.query,
        vec![("instId".to_string(), "BTC-USDT-SWAP".to_string())]
    );

    let body = json!({"code": "0", "msg": "", "data": [{"fundingRate": "-0.0001"}]});
    assert_percent(provider.parse(&btc_funding(), &body).unwrap(), -0.01);

    let failed = json!({"code": "51001", "msg": "Instrument ID does not exist", "data": []});
    assert!(provider.parse(&btc_funding(), &failed).is_err());
}

#[test]
fn okx_skips_non_usdt_symbols() {
    let provider = Okx::new(BASE);
    assert!(provider
        .build_request(&Metric::funding_rate("BTCUSD"))
        .is_none());
}

#[test]
fn coinglass_rate_is_already_percent() {
    let provider = CoinGlass::new(BASE, "secret");
    let request = provider.build_request(&btc_funding()).unwrap();
    assert!(request
        .headers
        .contains(&("coinglassSecret".to_string(), "secret".to_string())));
    assert!(request.query.contains(&("symbol".to_string(), "BTC".to_string())));

    let body = json!({
        "code": "0",
        "data": [{"symbol": "BTC", "uMarginList": [
            {"exchangeName": "Binance", "rate": 0.01},
            {"exchangeName": "Binance", "rate": 0.0125}
        ]}]
    });
    assert_percent(provider.parse(&btc_funding(), &body).unwrap(), 0.0125);
    assert!(provider
        .parse(&btc_funding(), &json!({"data": []}))
        .is_err());
}

#[test]
fn coinpaprika_dominance() {
    let provider = CoinPaprika::new(BASE);
    let body = json!({"market_cap_usd": 1, "bitcoin_dominance_percentage": 55.0});
    assert_percent(provider.parse(&Metric::BtcDominance, &body).unwrap(), 55.0);
    assert!(provider.build_request(&Metric::FearGreed).is_none());
}

#[test]
fn alternative_me_reads_value_and_classification() {
    let provider = AlternativeMe::new(BASE);
    let body = json!({
        "name": "Fear and Greed Index",
        "data": [{"value": "72", "value_classification": "Greed", "timestamp": "1"}]
    });
    assert_eq!(
        provider.parse(&Metric::FearGreed, &body).unwrap(),
        MetricValue::Sentiment {
            value: 72,
            classification: "Greed".to_string()
        }
    );
}

#[test]
fn alternative_me_rejects_out_of_range_index() {
    let provider = AlternativeMe::new(BASE);
    let body = json!({"data": [{"value": "140", "value_classification": "?"}]});
    assert!(provider.parse(&Metric::FearGreed, &body).is_err());
    assert!(provider
        .parse(&Metric::FearGreed, &json!({"data": []}))
        .is_err());
}

#[test]
fn glassnode_reads_latest_point_as_ratio() {
    let provider = Glassnode::new(BASE, "key");
    let request = provider.build_request(&Metric::MvrvZScore).unwrap();
    assert_eq!(
        request.url,
        "http://upstream.test/v1/metrics/market/mvrv_z_score"
    );
    assert!(request
        .query
        .contains(&("api_key".to_string(), "key".to_string())));

    let body = json!([{"t": 1, "v": 2.1}, {"t": 2, "v": 2.4}]);
    assert_eq!(
        provider.parse(&Metric::LthSopr, &body).unwrap(),
        MetricValue::Ratio(2.4)
    );
}

#[test]
fn registry_orders_fallbacks() {
    let registry = ProviderRegistry::from_config(&ProviderConfig::with_base_url(BASE));
    assert_eq!(
        registry.provider_names(MetricKind::BtcDominance),
        vec!["coingecko", "coinpaprika"]
    );
    assert_eq!(
        registry.provider_names(MetricKind::SpotPrices),
        vec!["coingecko", "binance-spot"]
    );
    assert_eq!(
        registry.provider_names(MetricKind::FearGreed),
        vec!["alternative.me"]
    );
}
