use tiup_http::HttpClient;
use tokio::io::AsyncWrite;

use crate::command::Command;
use crate::error::DispatchError;

/// Sends command batches to a playground's `/command` endpoint.
#[derive(Clone)]
pub struct CommandDispatcher {
    client: HttpClient,
}

impl CommandDispatcher {
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// POST each command in order to `http://<address>/command`, copying
    /// every response body to `out` before the next command is sent.
    ///
    /// The first failure stops the batch; later commands are never sent.
    ///
    /// # Errors
    /// Returns an error naming the failing command's index and type on a
    /// transport failure or a non-2xx status. For a status error the body has
    /// already been written to `out`.
    pub async fn send<W>(
        &self,
        commands: &[Command],
        address: &str,
        out: &mut W,
    ) -> Result<(), DispatchError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let url = format!("http://{address}/command");

        for (index, command) in commands.iter().enumerate() {
            let command_type = command.command_type();
            let request_failed = |source| DispatchError::Request {
                index,
                command_type,
                source,
            };

            tracing::debug!(index, %command_type, pid = ?command.pid(), url = %url, "sending playground command");
            let response = self
                .client
                .post_json(&url, command)
                .await
                .map_err(request_failed)?;
            let status = response.status();
            response.copy_to(out).await.map_err(request_failed)?;

            if !status.is_success() {
                return Err(DispatchError::Status {
                    index,
                    command_type,
                    status: status.as_u16(),
                });
            }
        }
        Ok(())
    }
}
