use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least two source URLs after query expansion
/// - Jackett has a URL and API key when configured
/// - TMDB has an API key when configured
/// - Database path is set when persisting
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url_count = config.source_urls().len();
    if url_count < 2 {
        return Err(ConfigError::ValidationError(format!(
            "search needs at least two source urls, got {}",
            url_count
        )));
    }

    if let Some(jackett) = &config.jackett {
        if jackett.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "jackett.url cannot be empty".to_string(),
            ));
        }
        if jackett.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "jackett.api_key cannot be empty".to_string(),
            ));
        }
        if jackett.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "jackett.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    if let Some(tmdb) = &config.tmdb {
        if tmdb.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tmdb.api_key cannot be empty".to_string(),
            ));
        }
    }

    if config.database.persist && config.database.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty when persist is enabled".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JackettConfig, SearchConfig};
    use crate::external_catalog::TmdbConfig;

    fn valid_config() -> Config {
        Config {
            search: SearchConfig {
                urls: vec![
                    "http://rutor.example/1".to_string(),
                    "http://kinozal.example/1".to_string(),
                ],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_single_url_fails() {
        let mut config = valid_config();
        config.search.urls.truncate(1);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_queries_count_as_urls() {
        let config = Config {
            search: SearchConfig {
                queries: vec!["2160p".to_string()],
                ..Default::default()
            },
            jackett: Some(JackettConfig {
                url: "http://localhost:9117".to_string(),
                api_key: "key".to_string(),
                timeout_secs: 30,
            }),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_tmdb_key_fails() {
        let mut config = valid_config();
        config.tmdb = Some(TmdbConfig {
            api_key: " ".to_string(),
            base_url: None,
            language: "ru".to_string(),
            timeout_secs: 30,
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_jackett_timeout_fails() {
        let mut config = valid_config();
        config.jackett = Some(JackettConfig {
            url: "http://localhost:9117".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 0,
        });
        assert!(validate_config(&config).is_err());
    }
}
