//! SigV4 signing for the RDS log download endpoint.

use std::time::SystemTime;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use dyn_clone::DynClone;

pub const RDS_SIGNING_NAME: &str = "rds";

/// Produces the headers that authenticate one GET request.
///
/// Called once per download attempt; signatures are time-limited.
#[async_trait]
pub trait RequestSigner: DynClone {
    async fn sign_get(&self, url: &str) -> Result<Vec<(String, String)>>;
}

dyn_clone::clone_trait_object!(RequestSigner);

#[derive(Clone)]
pub struct SigV4Signer {
    credentials_provider: SharedCredentialsProvider,
    region: String,
}

impl SigV4Signer {
    pub fn new(credentials_provider: SharedCredentialsProvider, region: &str) -> Self {
        Self {
            credentials_provider,
            region: region.to_string(),
        }
    }
}

#[async_trait]
impl RequestSigner for SigV4Signer {
    async fn sign_get(&self, url: &str) -> Result<Vec<(String, String)>> {
        let credentials = self
            .credentials_provider
            .provide_credentials()
            .await
            .context("failed to resolve AWS credentials.")?;
        let identity = Identity::from(credentials);

        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(RDS_SIGNING_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .context("failed to build SigV4 signing params.")?
            .into();

        let signable_request =
            SignableRequest::new("GET", url, std::iter::empty(), SignableBody::Bytes(&[]))
                .context("failed to build signable request.")?;

        let (signing_instructions, _signature) = sign(signable_request, &signing_params)
            .context("aws_sigv4::http_request::sign() failed.")?
            .into_parts();

        Ok(signing_instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}
