#[cfg(test)]
mod tests {
    use std::time::Duration;

    use des_parallel_core::config::{validate_request, EngineConfig};
    use des_parallel_core::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_WORKERS};
    use des_parallel_core::strategy::StrategyKind;
    use des_parallel_core::EngineError;

    #[test]
    fn defaults_match_benchmark_run() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.worker_count, DEFAULT_WORKERS);
        assert_eq!(cfg.worker_count, 5);
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(cfg.chunk_size, 1024 * 1024);
        assert_eq!(cfg.deadline(), Duration::from_secs(120));
        assert_eq!(cfg.strategy, StrategyKind::WorkerPool);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn dynamic_config_has_at_least_one_worker() {
        let cfg = EngineConfig::dynamic();
        assert!(cfg.worker_count >= 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "worker_count": 8, "strategy": "cooperative" }"#).unwrap();
        assert_eq!(cfg.worker_count, 8);
        assert_eq!(cfg.strategy, StrategyKind::Cooperative);
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(EngineConfig::from_json("{ not json"), Err(EngineError::Config(_))));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "strategy": "green_threads" }"#),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn json_with_invalid_values_fails_validation() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "worker_count": 0 }"#),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "deadline_ms": 0 }"#),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn builders_set_fields() {
        let cfg = EngineConfig::default()
            .with_workers(3)
            .with_chunk_size(4096)
            .with_deadline(Duration::from_millis(1500))
            .with_strategy(StrategyKind::Cooperative);
        assert_eq!(cfg.worker_count, 3);
        assert_eq!(cfg.chunk_size, 4096);
        assert_eq!(cfg.deadline_ms, 1500);

        let strategy = cfg.build_strategy().unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Cooperative);
        assert_eq!(strategy.deadline(), Duration::from_millis(1500));
    }

    #[test]
    fn worker_count_has_no_upper_bound() {
        assert!(validate_request(4096, 8).is_ok());
        assert!(validate_request(usize::MAX, 8).is_ok());
        assert!(EngineConfig::default().with_workers(10_000).validate().is_ok());
    }

    #[test]
    fn build_strategy_validates_first() {
        let cfg = EngineConfig::default().with_chunk_size(0);
        assert!(cfg.build_strategy().is_err());
    }

    #[test]
    fn request_bounds() {
        assert!(validate_request(1, 1).is_ok());
        assert!(matches!(validate_request(0, 8), Err(EngineError::Validation(_))));
        assert!(matches!(validate_request(4, 0), Err(EngineError::Validation(_))));
    }

    #[test]
    fn strategy_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&StrategyKind::WorkerPool).unwrap(), r#""worker_pool""#);
        assert_eq!(StrategyKind::Cooperative.to_string(), "cooperative");
        let round: EngineConfig = serde_json::from_str(&serde_json::to_string(&EngineConfig::default()).unwrap()).unwrap();
        assert_eq!(round, EngineConfig::default());
    }
}
