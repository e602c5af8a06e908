use std::fs;
use tracing::info;

use nwt::cli::{Command, CryptoOp, LiquidOp, RdOp, StockOp};
use nwt::ledger::{Currency, Ledger, LiquidAccountKind, ReceivableKind};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server() -> MockServer {
        MockServer::start().await
    }

    pub async fn mount_chart(mock_server: &MockServer, ticker: &str, body: &str) {
        let url_path = format!("/v8/finance/chart/{ticker}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    pub fn price_body(price: f64, currency: &str) -> String {
        format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{
                            "regularMarketPrice": {price},
                            "currency": "{currency}"
                        }}
                    }}]
                }}
            }}"#
        )
    }
}

struct TestEnv {
    _dir: tempfile::TempDir,
    config_path: std::path::PathBuf,
    ledger_path: std::path::PathBuf,
}

impl TestEnv {
    fn new(yahoo_base_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.yaml");
        let ledger_path = dir.path().join("assets.json");

        let config_content = format!(
            r#"
            ledger_path: "{}"
            providers:
              yahoo:
                base_url: {}
            fallback_exchange_rate: 1350.0
        "#,
            ledger_path.display(),
            yahoo_base_url
        );
        fs::write(&config_path, &config_content).expect("Failed to write config file");

        TestEnv {
            _dir: dir,
            config_path,
            ledger_path,
        }
    }

    async fn run(&self, command: Command) -> anyhow::Result<()> {
        nwt::run_command(command, Some(self.config_path.to_str().unwrap()), None).await
    }

    fn load_ledger(&self) -> Ledger {
        let contents = fs::read_to_string(&self.ledger_path).expect("Ledger file missing");
        serde_json::from_str(&contents).expect("Ledger file unparsable")
    }
}

#[test_log::test(tokio::test)]
async fn liquid_flow_persists_through_the_file() {
    let env = TestEnv::new("http://unused.invalid");

    env.run(Command::Liquid {
        op: Some(LiquidOp::Add {
            kind: LiquidAccountKind::Checking,
            name: "KB".to_string(),
            balance: 1000,
            tags: vec!["#Checking Account".to_string()],
        }),
    })
    .await
    .unwrap();

    env.run(Command::Liquid {
        op: Some(LiquidOp::Deposit {
            kind: LiquidAccountKind::Checking,
            name: "KB".to_string(),
            amount: 500,
        }),
    })
    .await
    .unwrap();

    let ledger = env.load_ledger();
    info!(?ledger.summary, "ledger after deposits");
    let entry = ledger
        .liquid_assets
        .checking_account
        .entry("KB")
        .expect("entry missing");
    assert_eq!(entry.amount_krw, 1500);
    assert_eq!(ledger.liquid_assets.total_krw, 1500);
    assert_eq!(ledger.summary.liquid_assets_krw, 1500);
    assert_eq!(ledger.summary.converted_total_krw, 1500);
}

#[test_log::test(tokio::test)]
async fn failed_withdrawal_leaves_the_file_untouched() {
    let env = TestEnv::new("http://unused.invalid");

    env.run(Command::Liquid {
        op: Some(LiquidOp::Add {
            kind: LiquidAccountKind::Checking,
            name: "KB".to_string(),
            balance: 1000,
            tags: vec![],
        }),
    })
    .await
    .unwrap();
    let before = fs::read_to_string(&env.ledger_path).unwrap();

    let result = env
        .run(Command::Liquid {
            op: Some(LiquidOp::Withdraw {
                kind: LiquidAccountKind::Checking,
                name: "KB".to_string(),
                amount: 1500,
            }),
        })
        .await;

    assert!(result.is_err());
    let after = fs::read_to_string(&env.ledger_path).unwrap();
    assert_eq!(before, after);
}

#[test_log::test(tokio::test)]
async fn duplicate_account_names_get_suffixed() {
    let env = TestEnv::new("http://unused.invalid");

    for balance in [1000, 500] {
        env.run(Command::Liquid {
            op: Some(LiquidOp::Add {
                kind: LiquidAccountKind::Checking,
                name: "KB".to_string(),
                balance,
                tags: vec![],
            }),
        })
        .await
        .unwrap();
    }

    let ledger = env.load_ledger();
    let bucket = &ledger.liquid_assets.checking_account;
    assert!(bucket.entry("KB").is_some());
    assert!(bucket.entry("KB (1)").is_some());
    assert_eq!(bucket.total_krw, 1500);
}

#[test_log::test(tokio::test)]
async fn loan_out_upserts_by_counterparty() {
    let env = TestEnv::new("http://unused.invalid");

    env.run(Command::Rd {
        op: Some(RdOp::LoanOut {
            kind: ReceivableKind::Receivables,
            name: "Alice".to_string(),
            amount: 300,
            tags: vec!["#original".to_string()],
        }),
    })
    .await
    .unwrap();
    env.run(Command::Rd {
        op: Some(RdOp::LoanOut {
            kind: ReceivableKind::Receivables,
            name: "Alice".to_string(),
            amount: 200,
            tags: vec!["#ignored".to_string()],
        }),
    })
    .await
    .unwrap();

    let ledger = env.load_ledger();
    let entry = ledger
        .receivables_and_deposits
        .receivables
        .entry("Alice")
        .expect("entry missing");
    assert_eq!(entry.amount_krw, 500);
    assert_eq!(entry.tags, vec!["#original".to_string()]);
    assert_eq!(ledger.summary.receivables_and_deposits_krw, 500);
}

#[test_log::test(tokio::test)]
async fn stock_buy_flow_updates_sentinel_and_booked_totals() {
    let env = TestEnv::new("http://unused.invalid");

    env.run(Command::Stocks {
        op: Some(StockOp::AddAccount {
            name: "Main".to_string(),
        }),
    })
    .await
    .unwrap();
    env.run(Command::Stocks {
        op: Some(StockOp::Deposit {
            account: "Main".to_string(),
            currency: Currency::Usd,
            amount: 100.0,
        }),
    })
    .await
    .unwrap();
    env.run(Command::Stocks {
        op: Some(StockOp::Buy {
            account: "Main".to_string(),
            symbol: "AAPL".to_string(),
            quantity: 10.0,
            price: 5.0,
            ticker: "AAPL".to_string(),
            currency: Currency::Usd,
            tags: vec![],
        }),
    })
    .await
    .unwrap();

    let ledger = env.load_ledger();
    assert_eq!(ledger.stocks.total_usd, 50.0);
    let holdings = ledger.stocks.account("Main").expect("account missing");
    let stock = holdings
        .iter()
        .find_map(|h| h.as_stock())
        .expect("holding missing");
    assert_eq!(stock.quantity, 10.0);
    // Default tag applied when none supplied.
    assert_eq!(stock.tags, vec!["#Investment Assets".to_string()]);
}

#[test_log::test(tokio::test)]
async fn crypto_exchange_lifecycle() {
    let env = TestEnv::new("http://unused.invalid");

    env.run(Command::Crypto {
        op: Some(CryptoOp::AddExchange {
            name: "Binance".to_string(),
        }),
    })
    .await
    .unwrap();

    let duplicate = env
        .run(Command::Crypto {
            op: Some(CryptoOp::AddExchange {
                name: "Binance".to_string(),
            }),
        })
        .await;
    assert!(duplicate.is_err());

    env.run(Command::Crypto {
        op: Some(CryptoOp::DeleteExchange {
            name: "Binance".to_string(),
        }),
    })
    .await
    .unwrap();

    let ledger = env.load_ledger();
    assert!(ledger.cryptocurrency.exchanges.is_empty());
}

#[test_log::test(tokio::test)]
async fn summary_runs_against_mocked_market_data() {
    let mock_server = test_utils::create_mock_server().await;
    test_utils::mount_chart(
        &mock_server,
        "USDKRW=X",
        &test_utils::price_body(1300.0, "KRW"),
    )
    .await;
    test_utils::mount_chart(&mock_server, "AAPL", &test_utils::price_body(5.0, "USD")).await;

    let env = TestEnv::new(&mock_server.uri());

    env.run(Command::Stocks {
        op: Some(StockOp::AddAccount {
            name: "Main".to_string(),
        }),
    })
    .await
    .unwrap();
    env.run(Command::Stocks {
        op: Some(StockOp::Deposit {
            account: "Main".to_string(),
            currency: Currency::Usd,
            amount: 100.0,
        }),
    })
    .await
    .unwrap();
    env.run(Command::Stocks {
        op: Some(StockOp::Buy {
            account: "Main".to_string(),
            symbol: "AAPL".to_string(),
            quantity: 10.0,
            price: 5.0,
            ticker: "AAPL".to_string(),
            currency: Currency::Usd,
            tags: vec![],
        }),
    })
    .await
    .unwrap();

    let result = env.run(Command::Summary).await;
    assert!(result.is_ok(), "Summary failed with: {:?}", result.err());

    // Aggregation must not have written anything back.
    let ledger = env.load_ledger();
    assert_eq!(ledger.stocks.total_usd, 50.0);
}

#[test_log::test(tokio::test)]
async fn summary_tolerates_unreachable_market_data() {
    // No mock server at all: price and rate fetches fail, the summary
    // degrades to fallback values instead of erroring.
    let env = TestEnv::new("http://127.0.0.1:9");

    env.run(Command::Liquid {
        op: Some(LiquidOp::Add {
            kind: LiquidAccountKind::Checking,
            name: "KB".to_string(),
            balance: 1000,
            tags: vec![],
        }),
    })
    .await
    .unwrap();

    let result = env.run(Command::Summary).await;
    assert!(result.is_ok(), "Summary failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn ledger_file_round_trips_byte_for_byte() {
    let env = TestEnv::new("http://unused.invalid");

    env.run(Command::Liquid {
        op: Some(LiquidOp::Add {
            kind: LiquidAccountKind::Checking,
            name: "국민은행".to_string(),
            balance: 1_000_000,
            tags: vec!["#Safe Assets".to_string()],
        }),
    })
    .await
    .unwrap();
    env.run(Command::Stocks {
        op: Some(StockOp::AddAccount {
            name: "Main".to_string(),
        }),
    })
    .await
    .unwrap();

    let first = fs::read_to_string(&env.ledger_path).unwrap();
    assert!(first.contains("국민은행"), "Unicode must be kept verbatim");

    // A no-op mutation cycle (load + save) reproduces the same bytes.
    let ledger = env.load_ledger();
    let store = nwt::store::LedgerStore::new(&env.ledger_path);
    store.save(&ledger).unwrap();
    let second = fs::read_to_string(&env.ledger_path).unwrap();
    assert_eq!(first, second);
}
