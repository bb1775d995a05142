// Session authentication
//
// The firmware's login is a four-step, order-dependent handshake:
//
//   1. token fetch        -> pre-auth cookie + login token
//   2. login-entry fetch  -> session token (JSON)
//   3. digest             -> SHA-256(password ++ login token), hex
//   4. form login         -> post-auth session cookie
//
// Step 4 and every later data fetch may answer in JSON or XML
// depending on the endpoint's mood, with the success/error signal in a
// different place for each shape, so responses are classified rather
// than parsed optimistically.

use chrono::Utc;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::header;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Error;
use crate::zxhn::client::ZxhnClient;

/// Status text the firmware uses for a successful ajax request.
const SUCCESS_SENTINEL: &str = "SUCC";

/// Root element of the firmware's XML-shaped responses.
const AJAX_ROOT: &str = "ajax_response_xml_root";

/// Cookies and tokens for one authenticated fetch sequence.
///
/// Produced by [`ZxhnClient::login`], passed into the data fetches, and
/// discarded at the end of the poll cycle. Never stored on the client
/// and never reused across cycles.
#[derive(Debug, Clone)]
pub struct Session {
    /// Cookie issued by the token endpoint; required by steps 2 and 4.
    pub pre_auth_cookie: String,
    /// Token from the login-entry endpoint, echoed in the login form.
    pub session_token: String,
    /// Session cookie issued on successful login; required by every
    /// data fetch.
    pub post_auth_cookie: String,
    /// Cache-busting request marker, fixed for the whole sequence.
    pub marker: i64,
}

/// Result of the dual-format response check.
///
/// The three branches are deliberately explicit: the firmware reports
/// login failures inside JSON, request failures inside XML, and
/// everything else (HTML pages included) is an opaque success.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Classification {
    /// JSON body carrying a `loginErrMsg` field.
    StructuredError(String),
    /// XML ajax wrapper whose status text is not the success sentinel.
    MarkupError(String),
    /// Anything else; the body is safe to use.
    Opaque,
}

impl ZxhnClient {
    /// Perform the login handshake and return a fresh [`Session`].
    pub async fn login(&self) -> Result<Session, Error> {
        let marker = Utc::now().timestamp_millis();

        // Step 1: login token. The token arrives wrapped in the ajax
        // root element; the pre-auth cookie rides the Set-Cookie header.
        let resp = self
            .http
            .get(self.query_url("loginData", "login_token", marker))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }
        let pre_auth_cookie = first_cookie_segment(&resp);
        let body = resp.text().await?;
        let login_token = delimited_token(&body)?;

        // Step 2: session token, now in a pre-auth cookie context.
        let resp = self
            .http
            .get(self.query_url("loginData", "login_entry", marker))
            .header(header::COOKIE, &pre_auth_cookie)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        let session_token = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("sess_token")
                    .and_then(|t| t.as_str())
                    .map(str::to_owned)
            })
            .ok_or_else(|| Error::parse("sess_token missing from login entry response"))?;

        // Steps 3 + 4: submit the digest through the login form. The
        // endpoint inspects browser headers and refuses bare clients.
        let digest = credential_digest(self.password.expose_secret(), &login_token);
        let origin = self.base_url.origin().ascii_serialization();
        // The form submission carries no cache marker -- only the two
        // query discriminators.
        let mut login_url = self.base_url.clone();
        login_url
            .query_pairs_mut()
            .append_pair("_type", "loginData")
            .append_pair("_tag", "login_entry");
        let resp = self
            .http
            .post(login_url)
            .header(header::COOKIE, &pre_auth_cookie)
            .header(header::ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header(header::ORIGIN, &origin)
            .header(header::REFERER, &origin)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&[
                ("action", "login"),
                ("Password", digest.as_str()),
                ("Username", self.username.as_str()),
                ("_sessionTOKEN", session_token.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }
        let post_auth_cookie = first_cookie_segment(&resp);
        let body = resp.text().await?;
        match classify(&body) {
            Classification::StructuredError(message) => {
                return Err(Error::Authentication { message });
            }
            Classification::MarkupError(status) => {
                return Err(Error::Protocol {
                    message: format!("login rejected with '{status}'"),
                });
            }
            Classification::Opaque => {}
        }

        debug!("session established");
        Ok(Session {
            pre_auth_cookie,
            session_token,
            post_auth_cookie,
            marker,
        })
    }
}

/// Classify a response body per the firmware's mixed JSON/XML habits.
///
/// Order matters and mirrors the observed behavior: a JSON body with
/// `loginErrMsg` wins (the login endpoint reports credential problems
/// that way even under HTTP 200); otherwise an XML ajax wrapper is
/// checked for its status text; anything else is an opaque success --
/// view navigations, for instance, answer with plain HTML.
pub(crate) fn classify(body: &str) -> Classification {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = value.get("loginErrMsg").and_then(|v| v.as_str()) {
            return Classification::StructuredError(msg.to_owned());
        }
    }

    match ajax_status(body) {
        Some(status) if status != SUCCESS_SENTINEL => Classification::MarkupError(status),
        _ => Classification::Opaque,
    }
}

/// If `body` is XML rooted at the ajax wrapper, return its embedded
/// status text (empty string when the status element is missing).
/// Returns `None` for anything that is not an ajax-wrapped document.
fn ajax_status(body: &str) -> Option<String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut seen_root = false;
    let mut in_status = false;
    loop {
        match reader.read_event() {
            Err(_) => return None,
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !seen_root {
                    if name != AJAX_ROOT {
                        return None;
                    }
                    seen_root = true;
                } else if name == "IF_ERRORSTR" {
                    in_status = true;
                }
            }
            Ok(Event::Text(t)) if in_status => {
                return Some(t.unescape().ok()?.into_owned());
            }
            Ok(Event::End(_)) => in_status = false,
            Ok(_) => {}
        }
    }

    seen_root.then(String::new)
}

/// First `;`-delimited segment of the Set-Cookie header -- the
/// `name=value` pair without attributes. Empty when the header is
/// absent, matching the firmware's habit of omitting it on re-login.
fn first_cookie_segment(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_owned())
        .unwrap_or_default()
}

/// The login token is embedded in the body between the first `>` and
/// the following `<` -- the text of the ajax root element.
fn delimited_token(body: &str) -> Result<String, Error> {
    let start = body
        .find('>')
        .ok_or_else(|| Error::parse("login token delimiters missing"))?;
    let rest = &body[start + 1..];
    let end = rest
        .find('<')
        .ok_or_else(|| Error::parse("login token delimiters missing"))?;
    Ok(rest[..end].to_owned())
}

/// Hex-encoded SHA-256 over password ++ server-issued token, submitted
/// in place of the plaintext password.
fn credential_digest(password: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
