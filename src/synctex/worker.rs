//! Sync worker - executes one request on the calling thread

use super::adapter::SyncTex;
use super::request::{SyncRequest, SyncResponse};

/// Run the tool for `request` and package the answer
pub fn run_request(synctex: &SyncTex, request: SyncRequest) -> SyncResponse {
    match request {
        SyncRequest::Forward {
            id,
            source,
            line,
            column,
            pdf,
        } => match synctex.forward_sync(&source, line, column, &pdf) {
            Ok(position) => SyncResponse::Forward { id, position },
            Err(error) => SyncResponse::Failed { id, error },
        },

        SyncRequest::Reverse { id, pdf, page, x, y } => {
            match synctex.reverse_sync(&pdf, page, x, y) {
                Ok(position) => SyncResponse::Reverse { id, position },
                Err(error) => SyncResponse::Failed { id, error },
            }
        }
    }
}
