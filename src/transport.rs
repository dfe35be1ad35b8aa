//! Delivery of dose payloads.
//!
//! The builder only knows the [`DoseTransport`] trait. The binary picks
//! [`HttpTransport`] for real runs and [`DryRunTransport`] for `--dry-run`.

use std::cell::RefCell;
use std::io::Write;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::dose::{DosePayload, MixPlan};
use crate::error::Result;

/// Default timeout for a request to the doser, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest timeout accepted from the command line, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Something that can deliver a dose payload to a URL
pub trait DoseTransport {
    /// Deliver `payload` to `url`.
    ///
    /// Only delivery failures are errors. What the doser answers is not
    /// interpreted.
    fn send(&self, url: &str, payload: &DosePayload) -> Result<()>;
}

/// POSTs payloads as JSON over HTTP
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl DoseTransport for HttpTransport {
    fn send(&self, url: &str, payload: &DosePayload) -> Result<()> {
        info!(%url, "Sending dose request");
        let response = self.client.post(url).json(payload).send()?;

        let status = response.status();
        if status.is_success() {
            info!(%status, "Doser accepted request");
        } else {
            warn!(%status, "Doser returned a non-success status");
        }
        Ok(())
    }
}

/// Writes the payload and its mix plan instead of sending anything
pub struct DryRunTransport<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> DryRunTransport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> DoseTransport for DryRunTransport<W> {
    fn send(&self, url: &str, payload: &DosePayload) -> Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "[DRY RUN] POST {url}")?;
        writeln!(out, "{}", serde_json::to_string_pretty(payload)?)?;
        writeln!(out, "{}", MixPlan::from_payload(payload))?;
        Ok(())
    }
}
