//! RFC 959 Section 4.2 - Reply codes
//!
//! Success spans 2xx and 3xx; 4xx and 5xx are failures.

use ftp_rs::{Reply, StatusCode};

#[test]
fn test_named_code_values() {
    assert_eq!(StatusCode::DataAlreadyOpen.code(), 125);
    assert_eq!(StatusCode::OpeningData.code(), 150);
    assert_eq!(StatusCode::CommandOk.code(), 200);
    assert_eq!(StatusCode::SystemStatus.code(), 211);
    assert_eq!(StatusCode::FileStatus.code(), 213);
    assert_eq!(StatusCode::ClosingControl.code(), 221);
    assert_eq!(StatusCode::ClosingData.code(), 226);
    assert_eq!(StatusCode::EnteringPassive.code(), 227);
    assert_eq!(StatusCode::EnteringExtendedPassive.code(), 229);
    assert_eq!(StatusCode::LoggedIn.code(), 230);
    assert_eq!(StatusCode::FileActionOk.code(), 250);
    assert_eq!(StatusCode::PathnameCreated.code(), 257);
    assert_eq!(StatusCode::NeedPassword.code(), 331);
    assert_eq!(StatusCode::NeedAccount.code(), 332);
    assert_eq!(StatusCode::FileActionPending.code(), 350);
    assert_eq!(StatusCode::ServiceNotAvailable.code(), 421);
    assert_eq!(StatusCode::FileBusy.code(), 450);
    assert_eq!(StatusCode::SyntaxError.code(), 500);
    assert_eq!(StatusCode::NotImplemented.code(), 502);
    assert_eq!(StatusCode::NotLoggedIn.code(), 530);
    assert_eq!(StatusCode::FileUnavailable.code(), 550);
    assert_eq!(StatusCode::InvalidFileName.code(), 553);
}

#[test]
fn test_mapping_round_trip() {
    for code in 100u16..600 {
        assert_eq!(StatusCode::from_u16(code).code(), code);
    }
}

#[test]
fn test_success_range() {
    assert!(!StatusCode::from_u16(150).is_success());
    assert!(StatusCode::CommandOk.is_success());
    assert!(StatusCode::FileActionPending.is_success());
    assert!(StatusCode::NeedPassword.is_success());
    assert!(!StatusCode::ServiceNotAvailable.is_success());
    assert!(!StatusCode::FileUnavailable.is_success());
}

#[test]
fn test_reply_require_success() {
    let reply = Reply {
        status: StatusCode::FileActionOk,
        message: "done".to_string(),
        lines: vec!["250 done".to_string()],
    };
    assert!(reply.clone().require_success().is_ok());

    let reply = Reply {
        status: StatusCode::NotLoggedIn,
        message: "login first".to_string(),
        lines: vec!["530 login first".to_string()],
    };
    let err = reply.require_success().unwrap_err();
    assert_eq!(err.to_string(), "FTP error 530: login first");
}
