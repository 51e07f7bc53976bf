//! Utilities for downloading files
use http::StatusCode;
use log::debug;
use std::io::Write;
use std::time::Duration;

use curl::easy::Easy;

use crate::error::support::CURLError;
use crate::error::{DownloadError, Error, ErrorExt, Throwable};

/// The maximum amount of bytes a script may have to be downloaded into memory (12 MiB)
pub static DOWNLOAD_LIMIT: usize = 12 * 1024 * 1024;

/// The size of the chunks CURL hands to the write callback
pub static CHUNK_SIZE: usize = 4096;

/// Something that can fetch a remote script into memory
pub trait ScriptFetcher {
    /// Fetches the resource at `url` completely into memory
    /// # Arguments
    /// * `url` - The URL to fetch from
    /// * `verbose` - Whether to print a progress marker for every received chunk
    /// # Errors
    /// - `DownloadError::LimitExceeded` if the resource is larger than the fetcher's limit
    /// - Any transport error
    fn fetch(&self, url: &str, verbose: bool) -> Result<Vec<u8>, Error>;
}

/// Fetches scripts using CURL, enforcing a size limit
pub struct CurlFetcher {
    /// The maximum amount of bytes to accept
    pub limit: usize,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            limit: DOWNLOAD_LIMIT,
        }
    }
}

impl ScriptFetcher for CurlFetcher {
    fn fetch(&self, url: &str, verbose: bool) -> Result<Vec<u8>, Error> {
        let context = || format!("Fetching {url}");

        let mut buffer = LimitedBuffer::new(self.limit);
        let res = download(url, &context(), true, |data| {
            let accepted = buffer.push(data);
            if accepted && verbose {
                progress_marker(".");
            }
            accepted
        });
        if verbose {
            progress_marker("\n");
        }

        // An exceeded limit aborts the transfer, report that instead of the write error
        let data = buffer.finish(url).e_context(context)?;
        res?;

        Ok(data)
    }
}

/// A buffer that refuses to grow beyond a fixed limit
#[derive(Debug)]
pub struct LimitedBuffer {
    data: Vec<u8>,
    limit: usize,
    exceeded: bool,
}

impl LimitedBuffer {
    /// Creates a new, empty buffer accepting at most `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
            exceeded: false,
        }
    }

    /// Appends `chunk` to the buffer
    ///
    /// If the chunk would push the buffer over its limit, nothing is appended,
    /// the buffer is marked as exceeded and all further chunks are refused.
    /// # Returns
    /// Whether the chunk was accepted
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.exceeded || self.data.len() + chunk.len() > self.limit {
            self.exceeded = true;
            return false;
        }

        self.data.extend_from_slice(chunk);
        true
    }

    /// Whether a chunk has been refused
    pub fn exceeded(&self) -> bool {
        self.exceeded
    }

    /// Consumes the buffer, returning its contents if the limit was never exceeded
    /// # Arguments
    /// * `url` - The url the contents came from, for error reporting
    pub fn finish(self, url: &str) -> Result<Vec<u8>, DownloadError> {
        if self.exceeded {
            Err(DownloadError::LimitExceeded {
                url: url.to_owned(),
                limit: self.limit,
            })
        } else {
            Ok(self.data)
        }
    }
}

/// Downloads the contents of the supplied url
/// # Arguments
/// * `url` - The URL to fetch from
/// * `message` - The message to log when downloading
/// * `expect_success` - If this function should return an error if a non-ok status code is encountered
/// * `write_function` - The callback to use for writing, returning `false` aborts the transfer
/// # Errors
/// - If the `expect_success` option is set to `true`, this function will error on a non-ok status
/// - If an unknown HTTP response status is received
/// - Any CURL error
pub fn download<'data, F>(
    url: &str,
    message: &str,
    expect_success: bool,
    mut write_function: F,
) -> Result<StatusCode, Error>
where
    F: FnMut(&[u8]) -> bool + Send + 'data,
{
    let context = || message.to_owned();

    //Create the curl context and set the url
    let mut easy = Easy::new();
    easy.url(url).e_context(context)?;

    //Allow CURL to follow redirections
    easy.follow_location(true).e_context(context)?;
    easy.buffer_size(CHUNK_SIZE).e_context(context)?;

    //Setup the low speed bounds (less that 1000bytes in 30 seconds)
    easy.low_speed_limit(1000).e_context(context)?;
    easy.low_speed_time(Duration::from_secs(30))
        .e_context(context)?;

    let transfer_res = {
        //Create a scoped transfer and perform it
        let mut transfer = easy.transfer();
        transfer
            .write_function(move |data| match write_function(data) {
                true => Ok(data.len()),
                false => Ok(data.len().saturating_sub(1)),
            })
            .e_context(context)?;

        debug!("{}", message);

        //Perform now
        transfer.perform()
    };

    match transfer_res {
        Ok(_) => {
            let code = easy.response_code().e_context(context)?;

            let status = match StatusCode::from_u16(code as u16) {
                Ok(status) => status,
                Err(_) => return Err(CURLError::InvalidStatus(code).throw(context())),
            };

            if expect_success && !status.is_success() {
                Err(CURLError::ErrorStatus(status).throw(context()))
            } else {
                Ok(status)
            }
        }
        Err(e) => Err(e.throw(context())),
    }
}

fn progress_marker(marker: &str) {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(marker.as_bytes());
    let _ = stderr.flush();
}
