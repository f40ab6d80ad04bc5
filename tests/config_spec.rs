use std::collections::HashMap;
use std::fs;

use speculate2::speculate;
use staffing_console::capacity::CapacityPolicy;
use staffing_console::config::*;
use staffing_console::error::ConfigError;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

speculate! {
    before {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
    }

    describe "from_file" {
        it "fills missing keys with defaults" {
            fs::write(&path, r#"{ "baseUrl": "https://staffing.example.com/api", "pageSize": 25 }"#)
                .expect("Failed to write config");

            let config = Config::from_file(&path).expect("Failed to load config");

            assert_eq!(config.base_url, "https://staffing.example.com/api");
            assert_eq!(config.page_size, 25);
            assert_eq!(config.broad_fetch_size, Config::default().broad_fetch_size);
            assert!(!config.strict_capacity);
        }

        it "reports a missing file" {
            let result = Config::from_file(&path);

            assert!(matches!(result, Err(ConfigError::Read { .. })));
        }

        it "reports malformed JSON" {
            fs::write(&path, "{ not json").expect("Failed to write config");

            let result = Config::from_file(&path);

            assert!(matches!(result, Err(ConfigError::Parse { .. })));
        }

        it "fails to load an explicit path that does not exist" {
            assert!(Config::load(Some(&path)).is_err());
        }
    }

    describe "apply_env" {
        before {
            let mut config = Config::default();
        }

        it "overrides file values" {
            config
                .apply_env(env(&[
                    (ENV_URL, "http://override:9000/api"),
                    (ENV_API_KEY, "k-123"),
                    (ENV_TIMEOUT, "5"),
                    (ENV_STRICT_CAPACITY, "true"),
                ]))
                .expect("Failed to apply env");

            assert_eq!(config.base_url, "http://override:9000/api");
            assert_eq!(config.api_key.as_deref(), Some("k-123"));
            assert_eq!(config.timeout_secs, 5);
            assert_eq!(config.capacity_policy(), CapacityPolicy::Strict);
        }

        it "leaves values alone when nothing is set" {
            config.apply_env(env(&[])).expect("Failed to apply env");

            assert_eq!(config, Config::default());
            assert_eq!(config.capacity_policy(), CapacityPolicy::Advisory);
        }

        it "clears the API key when set to an empty string" {
            config.api_key = Some("old".to_string());

            config.apply_env(env(&[(ENV_API_KEY, "")])).expect("Failed to apply env");

            assert_eq!(config.api_key, None);
        }

        it "rejects a malformed timeout" {
            let result = config.apply_env(env(&[(ENV_TIMEOUT, "soon")]));

            assert!(matches!(
                result,
                Err(ConfigError::InvalidEnv { key: ENV_TIMEOUT, .. })
            ));
        }

        it "rejects an unknown flag value" {
            let result = config.apply_env(env(&[(ENV_STRICT_CAPACITY, "maybe")]));

            assert!(result.is_err());
        }
    }
}
