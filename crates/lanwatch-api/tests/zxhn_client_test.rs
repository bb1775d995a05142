// Integration tests for `ZxhnClient` using wiremock.
//
// The mocks pin the whole handshake: cookie flow, digest, form fields,
// and the menuView/menuData fetch order, by refusing to match requests
// that arrive without the state established by the previous step.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lanwatch_api::{Error, TransportConfig, ZxhnClient};

const USERNAME: &str = "admin";
const PASSWORD: &str = "hunter2";
const LOGIN_TOKEN: &str = "8976";
// SHA-256("hunter2" ++ "8976"), hex
const DIGEST: &str = "a97c3ff9080956b75c0300faa2d99dcb178f7242617574c68831193166bd2078";
const PRE_AUTH: &str = "SID=preauth123";
const POST_AUTH: &str = "SID=postauth456";

const LEASE_XML: &str = "<ajax_response_xml_root><OBJ_DHCPHOSTINFO_ID>\
    <Instance>\
    <ParaName>OBJ_DHCPHOSTINFO_ID.IPAddr</ParaName><ParaValue>10.0.0.5</ParaValue>\
    <ParaName>OBJ_DHCPHOSTINFO_ID.MACAddr</ParaName><ParaValue>aa:bb:cc:dd:ee:ff</ParaValue>\
    <ParaName>OBJ_DHCPHOSTINFO_ID.HostName</ParaName><ParaValue>phone</ParaValue>\
    </Instance>\
    <Instance>\
    <ParaName>OBJ_DHCPHOSTINFO_ID.IPAddr</ParaName><ParaValue>10.0.0.7</ParaValue>\
    <ParaName>OBJ_DHCPHOSTINFO_ID.MACAddr</ParaName><ParaValue>11:22:33:44:55:66</ParaValue>\
    <ParaName>OBJ_DHCPHOSTINFO_ID.HostName</ParaName><ParaValue>laptop</ParaValue>\
    </Instance>\
    </OBJ_DHCPHOSTINFO_ID><IF_ERRORSTR>SUCC</IF_ERRORSTR></ajax_response_xml_root>";

const ARP_XML: &str = "<ajax_response_xml_root><OBJ_ARP_ID>\
    <Instance>\
    <ParaName>DestIP</ParaName><ParaValue>10.0.0.5</ParaValue>\
    <ParaName>Status</ParaName><ParaValue>1</ParaValue>\
    </Instance>\
    <Instance>\
    <ParaName>DestIP</ParaName><ParaValue>10.0.0.7</ParaValue>\
    <ParaName>Status</ParaName><ParaValue>0</ParaValue>\
    </Instance>\
    </OBJ_ARP_ID><IF_ERRORSTR>SUCC</IF_ERRORSTR></ajax_response_xml_root>";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ZxhnClient) {
    let server = MockServer::start().await;
    let base: Url = server.uri().parse().expect("mock server URL");
    let client = ZxhnClient::new(
        base,
        USERNAME.to_owned(),
        SecretString::from(PASSWORD.to_owned()),
        &TransportConfig::default(),
    )
    .expect("client");
    (server, client)
}

/// Mount the three login-step mocks (token, session token, form login).
async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("_type", "loginData"))
        .and(query_param("_tag", "login_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", format!("{PRE_AUTH}; path=/"))
                .set_body_string(format!(
                    "<ajax_response_xml_root>{LOGIN_TOKEN}</ajax_response_xml_root>"
                )),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("_type", "loginData"))
        .and(query_param("_tag", "login_entry"))
        .and(header("Cookie", PRE_AUTH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"sess_token":"sess789"}"#),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("_type", "loginData"))
        .and(query_param("_tag", "login_entry"))
        .and(header("Cookie", PRE_AUTH))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string_contains("action=login"))
        .and(body_string_contains(format!("Password={DIGEST}")))
        .and(body_string_contains(format!("Username={USERNAME}")))
        .and(body_string_contains("_sessionTOKEN=sess789"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", format!("{POST_AUTH}; HttpOnly"))
                .set_body_string("<html>logged in</html>"),
        )
        .mount(server)
        .await;
}

/// Mount the view + data mocks for both tables, gated on the session
/// cookie issued at login.
async fn mount_tables(server: &MockServer) {
    for tag in ["lanMgrIpv4", "arpTable"] {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("_type", "menuView"))
            .and(query_param("_tag", tag))
            .and(query_param("Menu3Location", "0"))
            .and(header("Cookie", POST_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>menu</html>"))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("_type", "menuData"))
        .and(query_param("_tag", "dhcp4s_dhcphostinfo_m.lua"))
        .and(header("Cookie", POST_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_string(LEASE_XML))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("_type", "menuData"))
        .and(query_param("_tag", "arp_arptable_lua.lua"))
        .and(header("Cookie", POST_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARP_XML))
        .mount(server)
        .await;
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_active_hosts() {
    let (server, client) = setup().await;
    mount_login(&server).await;
    mount_tables(&server).await;

    let hosts = client.list_active_hosts().await.expect("hosts");

    assert_eq!(hosts.len(), 1, "only the online lease should survive");
    assert_eq!(hosts[0].mac, "AA:BB:CC:DD:EE:FF");
    assert_eq!(hosts[0].name, "phone");
    assert_eq!(hosts[0].ip.as_deref(), Some("10.0.0.5"));
}

#[tokio::test]
async fn test_repeat_polls_yield_identical_hosts() {
    let (server, client) = setup().await;
    mount_login(&server).await;
    mount_tables(&server).await;

    let first = client.list_active_hosts().await.expect("first poll");
    let second = client.list_active_hosts().await.expect("second poll");

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_login_yields_single_use_session() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    let session = client.login().await.expect("session");

    assert_eq!(session.pre_auth_cookie, PRE_AUTH);
    assert_eq!(session.session_token, "sess789");
    assert_eq!(session.post_auth_cookie, POST_AUTH);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_error_field_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("_tag", "login_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", format!("{PRE_AUTH}; path=/"))
                .set_body_string(format!(
                    "<ajax_response_xml_root>{LOGIN_TOKEN}</ajax_response_xml_root>"
                )),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("_tag", "login_entry"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"sess_token":"sess789"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"loginErrMsg":"A higher-privilege user is already logged in"}"#,
        ))
        .mount(&server)
        .await;

    let result = client.list_active_hosts().await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "A higher-privilege user is already logged in");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_ajax_failure_status_is_protocol_error() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(query_param("_type", "menuView"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<ajax_response_xml_root><IF_ERRORSTR>FAIL</IF_ERRORSTR></ajax_response_xml_root>",
        ))
        .mount(&server)
        .await;

    let result = client.list_active_hosts().await;

    assert!(
        matches!(result, Err(Error::Protocol { .. })),
        "expected Protocol error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_non_2xx_is_status_error_before_parsing() {
    let (server, client) = setup().await;

    // Body would also fail token extraction; the status check must win.
    Mock::given(method("GET"))
        .and(query_param("_tag", "login_token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("no delimiters"))
        .mount(&server)
        .await;

    let result = client.list_active_hosts().await;

    assert!(
        matches!(result, Err(Error::Status { status: 500 })),
        "expected Status 500, got: {result:?}"
    );
}

#[tokio::test]
async fn test_missing_token_delimiters_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("_tag", "login_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let result = client.list_active_hosts().await;

    assert!(
        matches!(result, Err(Error::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_missing_sess_token_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("_tag", "login_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", format!("{PRE_AUTH}; path=/"))
                .set_body_string(format!(
                    "<ajax_response_xml_root>{LOGIN_TOKEN}</ajax_response_xml_root>"
                )),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("_tag", "login_entry"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .mount(&server)
        .await;

    let result = client.list_active_hosts().await;

    assert!(
        matches!(result, Err(Error::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}
