//! Cloud credential resolution and client construction.
//!
//! # Design
//! - Credentials are resolved once into an explicit value and handed to the
//!   components that need a client; nothing mutates process-global state.
//! - With `use_iam` (or no cloud configuration at all) the ambient provider
//!   chain applies, so instance roles and shared profiles keep working.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use chainscan_config::AwsConfig;

/// Provider name attached to statically configured credentials.
const STATIC_PROVIDER: &str = "chainscan-env";

/// Resolved cloud credentials, shared by every cloud-backed client.
#[derive(Debug, Clone)]
pub struct CloudCredentials {
    sdk_config: SdkConfig,
}

impl CloudCredentials {
    /// Resolve credentials from the optional cloud configuration.
    ///
    /// An explicit key pair short-circuits the ambient provider chain;
    /// `use_iam` or an absent configuration defers to it.
    pub async fn resolve(aws: Option<&AwsConfig>) -> Self {
        let loader = aws_config::defaults(BehaviorVersion::latest());
        let loader = match aws {
            Some(config) if !config.use_iam => loader
                .credentials_provider(Credentials::new(
                    config.access_key_id.clone(),
                    config.secret_access_key.clone(),
                    None,
                    None,
                    STATIC_PROVIDER,
                ))
                .region(Region::new(config.region.clone())),
            Some(config) => loader.region(Region::new(config.region.clone())),
            None => loader,
        };
        Self {
            sdk_config: loader.load().await,
        }
    }

    /// Wrap an already-built SDK configuration, for injection in tests and
    /// embeddings.
    #[must_use]
    pub const fn from_sdk_config(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    /// Client for queue deliveries.
    #[must_use]
    pub fn sqs_client(&self) -> aws_sdk_sqs::Client {
        aws_sdk_sqs::Client::new(&self.sdk_config)
    }

    /// Client for topic deliveries.
    #[must_use]
    pub fn sns_client(&self) -> aws_sdk_sns::Client {
        aws_sdk_sns::Client::new(&self.sdk_config)
    }

    /// Client for metric publishing.
    #[must_use]
    pub fn cloudwatch_client(&self) -> aws_sdk_cloudwatch::Client {
        aws_sdk_cloudwatch::Client::new(&self.sdk_config)
    }
}

#[cfg(test)]
pub(crate) fn offline_credentials() -> CloudCredentials {
    use aws_config::retry::RetryConfig;
    use aws_config::timeout::TimeoutConfig;
    use aws_smithy_async::rt::sleep::{SharedAsyncSleep, TokioSleep};

    // Client construction validates that a sleep implementation backs the
    // config, so the hand-built config must carry one explicitly.
    let sdk_config = SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .retry_config(RetryConfig::disabled())
        .timeout_config(TimeoutConfig::disabled())
        .sleep_impl(SharedAsyncSleep::new(TokioSleep::new()))
        .build();
    CloudCredentials::from_sdk_config(sdk_config)
}
