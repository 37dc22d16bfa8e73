use std::fmt;
use std::io::Cursor;

use google_drive3::{api::File, api::Scope, DriveHub};
use tokio::runtime::Runtime;

use super::repository::{BlobPublisher, PublishError, PublishedArtifact};

/// Thin wrapper around the generated google-drive3 client so the synchronous
/// generation pipeline can publish artifacts without exposing async details.
///
/// The publish namespace maps to a Drive folder id; the returned signed URL
/// is the uploaded file's web link, whose expiry the store controls.
pub struct DriveBlobPublisher<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    runtime: Runtime,
}

impl<C> DriveBlobPublisher<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, runtime: Runtime) -> Self {
        Self { hub, runtime }
    }

    pub fn with_runtime(hub: DriveHub<C>) -> Result<Self, PublishError> {
        let runtime = Runtime::new().map_err(|err| PublishError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, runtime))
    }

    fn map_error<E: fmt::Display>(err: E) -> PublishError {
        PublishError::Backend(err.to_string())
    }
}

impl<C> fmt::Debug for DriveBlobPublisher<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveBlobPublisher").finish_non_exhaustive()
    }
}

impl<C> BlobPublisher for DriveBlobPublisher<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn publish(
        &self,
        namespace: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PublishedArtifact, PublishError> {
        let metadata = File {
            name: Some(file_name.to_string()),
            parents: Some(vec![namespace.to_string()]),
            ..File::default()
        };

        let media_type = content_type
            .parse::<mime::Mime>()
            .map_err(Self::map_error)?;
        let cursor = Cursor::new(bytes);

        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .create(metadata)
                .param("fields", "id,webViewLink,webContentLink")
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .upload(cursor, media_type)
                .await
        });

        let (_, file) = result.map_err(Self::map_error)?;
        let signed_url = file
            .web_view_link
            .or(file.web_content_link)
            .ok_or_else(|| PublishError::Backend("upload response carried no link".to_string()))?;

        Ok(PublishedArtifact { signed_url })
    }
}
