/*
 * http.rs
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

//! HTTP transport: line-protocol writes and InfluxQL queries against a database server.
//!
//! Built from `http://host:port?db=<name>`. Writes go to `POST /write?db=<name>` and expect a
//! 2xx status (204 from the reference server); queries go to `GET /query?db=<name>&q=<q>`.

use tracing::debug;

use crate::config::ClientConfig;
use crate::protocol::http::{HttpClient, Method, Response};
use crate::transport::{Transport, TransportError};
use crate::uri::{encode_query_component, Endpoint};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
    base: Endpoint,
    database: String,
}

impl HttpTransport {
    /// `url` must carry the database name as its `db` query parameter.
    pub fn from_url(url: &str, config: ClientConfig) -> Result<Self, TransportError> {
        let endpoint = Endpoint::parse(url)?;
        let database = endpoint
            .query_param("db")
            .filter(|db| !db.is_empty())
            .ok_or_else(|| TransportError::InvalidUrl(format!("no database (db=...) in {:?}", url)))?;
        let prefix = endpoint.path_only().trim_end_matches('/').to_string();
        Ok(Self {
            client: HttpClient::new(config),
            base: endpoint.with_path(prefix),
            database,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Run an InfluxQL query against the configured database and return the JSON body.
    pub fn query(&self, query: &str) -> Result<String, TransportError> {
        let target = format!(
            "/query?db={}&q={}",
            encode_query_component(&self.database),
            encode_query_component(query)
        );
        let response = self.request(Method::Get, &target, None)?;
        Ok(response.text())
    }

    /// `CREATE DATABASE` for the configured database name.
    pub fn create_database(&self) -> Result<(), TransportError> {
        let statement = format!("CREATE DATABASE \"{}\"", self.database.replace('"', "\\\""));
        let target = format!("/query?q={}", encode_query_component(&statement));
        self.request(Method::Post, &target, None).map(|_| ())
    }

    /// Liveness probe; returns the server version header when present.
    pub fn ping(&self) -> Result<Option<String>, TransportError> {
        let response = self.request(Method::Get, "/ping", None)?;
        Ok(response
            .header("X-Influxdb-Version")
            .map(str::to_string))
    }

    fn request(&self, method: Method, target: &str, body: Option<&[u8]>) -> Result<Response, TransportError> {
        let endpoint = self.base.with_path(format!("{}{}", self.base.path().trim_end_matches('/'), target));
        let response = self.client.send_to(method, &endpoint, body)?;
        if !response.is_success() {
            debug!(status = response.status(), path = endpoint.path(), "server rejected request");
            return Err(TransportError::Status {
                code: response.status(),
                body: response.text(),
            });
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        let target = format!("/write?db={}", encode_query_component(&self.database));
        self.request(Method::Post, &target, Some(payload)).map(|_| ())
    }
}
