//! SSM client construction.

use aws_config::BehaviorVersion;
use aws_sdk_ssm as ssm;
use aws_types::region::Region;

/// Build an SSM client for `region` from the default credential chain.
pub async fn ssm_client(region: &str) -> ssm::Client {
    tracing::debug!(region, "loading AWS config for SSM client");
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    ssm::Client::new(&config)
}

/// Build an SSM client from an already-loaded SDK config.
///
/// Used when the host supplies its own credential setup.
pub fn ssm_client_from(config: &aws_config::SdkConfig) -> ssm::Client {
    ssm::Client::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_uses_requested_region() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let client = ssm_client("eu-west-1").await;
        assert_eq!(
            client.config().region().map(|region| region.as_ref()),
            Some("eu-west-1")
        );
    }
}
