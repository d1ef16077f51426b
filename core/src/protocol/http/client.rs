/*
 * client.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fluxwire, a time-series database client library.
 *
 * Fluxwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fluxwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fluxwire.  If not, see <http://www.gnu.org/licenses/>.
 */

//! HTTP client: one blocking exchange per call. Connect, write the whole request, read the
//! whole response, close. Nothing is shared between calls, so one client can be used from
//! several threads at once.

use std::io::Write;

use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::net::Connection;
use crate::protocol::http::error::is_timeout;
use crate::protocol::http::receiver;
use crate::protocol::http::request::{Method, OutgoingRequest};
use crate::protocol::http::response::Response;
use crate::protocol::http::HttpError;
use crate::uri::Endpoint;

/// Exchange progress, logged at trace level as it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    Connecting,
    Sending,
    Receiving,
    Complete,
    Error,
}

/// Blocking HTTP/1.1 client. Holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::Get, url, None)
    }

    pub fn put(&self, url: &str, body: &[u8]) -> Result<Response, HttpError> {
        self.send(Method::Put, url, Some(body))
    }

    pub fn post(&self, url: &str, body: &[u8]) -> Result<Response, HttpError> {
        self.send(Method::Post, url, Some(body))
    }

    /// Parse `url` and perform one exchange.
    pub fn send(&self, method: Method, url: &str, body: Option<&[u8]>) -> Result<Response, HttpError> {
        let endpoint = Endpoint::parse(url)?;
        self.send_to(method, &endpoint, body)
    }

    /// Perform one exchange against an already-parsed endpoint. The connection is closed before
    /// this returns, whatever the outcome.
    pub fn send_to(&self, method: Method, endpoint: &Endpoint, body: Option<&[u8]>) -> Result<Response, HttpError> {
        debug!(%method, host = endpoint.host(), port = endpoint.port(), path = endpoint.path(), "http request");
        let mut state = ExchangeState::Connecting;
        trace!(?state, "exchange state");
        let result = self.exchange(method, endpoint, body, &mut state);
        match &result {
            Ok(response) => {
                trace!(?state, "exchange state");
                debug!(status = response.status(), content_length = response.content().len(), "http response");
            }
            Err(e) => {
                debug!(failed_in = ?state, error = %e, "http request failed");
                trace!(state = ?ExchangeState::Error, "exchange state");
            }
        }
        result
    }

    fn exchange(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&[u8]>,
        state: &mut ExchangeState,
    ) -> Result<Response, HttpError> {
        let mut conn = Connection::open(endpoint, self.config.connect_timeout())?;

        *state = ExchangeState::Sending;
        trace!(?state, peer = %conn.peer_addr(), "exchange state");
        conn.set_write_timeout(self.config.write_timeout()).map_err(HttpError::Send)?;
        let request = OutgoingRequest::new(method, endpoint, body).encode();
        conn.write_all(&request)
            .and_then(|_| conn.flush())
            .map_err(|e| {
                if is_timeout(&e) {
                    HttpError::Timeout("sending request")
                } else {
                    HttpError::Send(e)
                }
            })?;

        *state = ExchangeState::Receiving;
        trace!(?state, "exchange state");
        conn.set_read_deadline(self.config.response_timeout())
            .map_err(HttpError::Receive)?;
        let response = receiver::receive(&mut conn, self.config.max_response_size)?;

        *state = ExchangeState::Complete;
        Ok(response)
    }
}
