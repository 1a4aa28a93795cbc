mod client;
mod error;
mod interfaces;

pub use client::*;
pub use error::*;
pub use interfaces::*;

use async_trait::async_trait;

/// Anything that can turn a base64 face image into an embedding.
#[async_trait]
pub trait FaceEmbedder: Send + Sync {
    async fn embed(&self, image_b64: &str) -> Result<Vec<f32>, FaceClientError>;
}

#[async_trait]
impl FaceEmbedder for FaceClient {
    async fn embed(&self, image_b64: &str) -> Result<Vec<f32>, FaceClientError> {
        Self::embed(self, image_b64).await
    }
}
