/*
 * lib.rs
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

//! C FFI for fluxwire core. One blocking HTTP exchange per call, plus fire-and-forget
//! transport sends selected by URL.
//! All string parameters are UTF-8 NUL-terminated. Functions return 0 on success and -1 on
//! failure; the failure message is then available from fluxwire_last_error.

use libc::{c_char, c_int, size_t};
use once_cell::sync::Lazy;
use std::ffi::{CStr, CString};
use std::ptr;

use fluxwire_core::{from_url, ClientConfig, HttpClient, Method};

pub const FLUXWIRE_METHOD_GET: c_int = 0;
pub const FLUXWIRE_METHOD_PUT: c_int = 1;
pub const FLUXWIRE_METHOD_POST: c_int = 2;

/// Client with default settings, shared by every call. It holds no per-request state.
static CLIENT: Lazy<HttpClient> = Lazy::new(|| HttpClient::new(ClientConfig::default()));

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = const { std::cell::RefCell::new(None) };
}

fn set_last_error(msg: impl std::fmt::Display) {
    let msg = CString::new(msg.to_string().replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

unsafe fn ptr_to_str<'a>(p: *const c_char) -> Option<&'a str> {
    if p.is_null() {
        return None;
    }
    CStr::from_ptr(p).to_str().ok()
}

unsafe fn bytes_arg<'a>(p: *const u8, len: size_t) -> &'a [u8] {
    if p.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(p, len)
    }
}

/// Response to fluxwire_http_request. Owned by the caller; free with fluxwire_free_response.
#[repr(C)]
pub struct FluxwireResponse {
    pub status: c_int,
    /// Status line and headers, CRLF-separated.
    pub headers: *mut c_char,
    pub content: *mut u8,
    pub content_len: size_t,
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn fluxwire_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

/// Last error message from a failed call on this thread. Valid until the next FFI call. Do not free.
#[no_mangle]
pub extern "C" fn fluxwire_last_error() -> *const c_char {
    LAST_ERROR.with(|e| e.borrow().as_ref().map(|s| s.as_ptr()).unwrap_or(ptr::null()))
}

/// Free a string returned by this library. No-op if ptr is NULL.
#[no_mangle]
pub unsafe extern "C" fn fluxwire_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Free the buffers inside a response filled by fluxwire_http_request. The struct itself is
/// caller storage and is left zeroed.
#[no_mangle]
pub unsafe extern "C" fn fluxwire_free_response(resp: *mut FluxwireResponse) {
    if resp.is_null() {
        return;
    }
    let r = &mut *resp;
    fluxwire_free_string(r.headers);
    if !r.content.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(r.content, r.content_len)));
    }
    r.status = 0;
    r.headers = ptr::null_mut();
    r.content = ptr::null_mut();
    r.content_len = 0;
}

/// Perform one HTTP exchange. method: FLUXWIRE_METHOD_*. body may be NULL when body_len is 0.
/// On success fills *out and returns 0; any status code counts as success.
#[no_mangle]
pub unsafe extern "C" fn fluxwire_http_request(
    method: c_int,
    url: *const c_char,
    body: *const u8,
    body_len: size_t,
    out: *mut FluxwireResponse,
) -> c_int {
    if out.is_null() {
        set_last_error("out is null");
        return -1;
    }
    let method = match method {
        FLUXWIRE_METHOD_GET => Method::Get,
        FLUXWIRE_METHOD_PUT => Method::Put,
        FLUXWIRE_METHOD_POST => Method::Post,
        other => {
            set_last_error(format!("unknown method {}", other));
            return -1;
        }
    };
    let Some(url) = ptr_to_str(url) else {
        set_last_error("url is null or not valid UTF-8");
        return -1;
    };
    let body = bytes_arg(body, body_len);
    let body = (!body.is_empty()).then_some(body);

    match CLIENT.send(method, url, body) {
        Ok(response) => {
            let status = c_int::from(response.status());
            let headers = CString::new(response.header_block().replace('\0', " ")).unwrap_or_default();
            let content: Box<[u8]> = response.into_content().to_vec().into_boxed_slice();
            let content_len = content.len();
            *out = FluxwireResponse {
                status,
                headers: headers.into_raw(),
                content: if content_len == 0 {
                    ptr::null_mut()
                } else {
                    Box::into_raw(content) as *mut u8
                },
                content_len,
            };
            clear_last_error();
            0
        }
        Err(e) => {
            set_last_error(&e);
            -1
        }
    }
}

/// Send one payload through the transport named by url (http://host:port?db=name,
/// udp://host:port, unix:///path).
#[no_mangle]
pub unsafe extern "C" fn fluxwire_transport_send(url: *const c_char, payload: *const u8, len: size_t) -> c_int {
    let Some(url) = ptr_to_str(url) else {
        set_last_error("url is null or not valid UTF-8");
        return -1;
    };
    let payload = bytes_arg(payload, len);
    let result = from_url(url, CLIENT.config()).and_then(|t| t.send(payload));
    match result {
        Ok(()) => {
            clear_last_error();
            0
        }
        Err(e) => {
            set_last_error(&e);
            -1
        }
    }
}
