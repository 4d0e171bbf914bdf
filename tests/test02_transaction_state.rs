mod common;

use tokio::runtime::Runtime;
use yugabyte_adapter::prelude::*;

use common::{MockSession, SessionLog, open_with_session, outcome_for};

#[test]
fn begin_and_commit_send_the_statement_pair() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, MockSession::ok(log.clone())).await;

        connection.begin().await?;
        assert!(connection.transaction_open());
        assert_eq!(
            log.take(),
            vec!["COMMIT".to_string(), "BEGIN".to_string()],
            "the clearing commit goes out before the begin"
        );

        connection.commit().await?;
        assert!(!connection.transaction_open());
        assert_eq!(log.take(), vec!["COMMIT".to_string()]);
        Ok::<(), AdapterError>(())
    })?;
    println!("Transaction pair completed");
    Ok(())
}

#[test]
fn beginning_twice_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, MockSession::ok(log)).await;

        connection.begin().await?;
        let error = connection.begin().await.unwrap_err();
        match error {
            AdapterError::InternalError(message) => {
                assert!(message.contains("already had one open"));
            }
            other => panic!("expected an internal error, got {other:?}"),
        }
        assert!(
            connection.transaction_open(),
            "the first transaction stays open"
        );
        Ok::<(), AdapterError>(())
    })?;
    Ok(())
}

#[test]
fn committing_without_a_transaction_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, MockSession::ok(log.clone())).await;

        let error = connection.commit().await.unwrap_err();
        match error {
            AdapterError::InternalError(message) => {
                assert!(message.contains("does not have one open"));
            }
            other => panic!("expected an internal error, got {other:?}"),
        }
        assert!(log.recorded().is_empty(), "nothing reaches the server");
    });
    Ok(())
}

#[test]
fn disabled_transactions_only_track_state() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let credentials = Credentials {
            enable_transaction: false,
            ..Credentials::default()
        };
        let log = SessionLog::new();
        let mut connection = Connection::new("tx", credentials);
        open_with_session(&mut connection, MockSession::ok(log.clone())).await;

        connection.begin().await?;
        assert!(connection.transaction_open());
        connection.commit().await?;
        assert!(!connection.transaction_open());
        assert!(
            log.recorded().is_empty(),
            "state transitions must not touch the session"
        );
        Ok::<(), AdapterError>(())
    })?;
    Ok(())
}

#[test]
fn rejected_clearing_commit_is_swallowed() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let mut first_commit = true;
        let session = MockSession::with_responder(log.clone(), move |sql| {
            if sql == "COMMIT" && std::mem::take(&mut first_commit) {
                Err(AdapterError::DatabaseError(
                    "there is no transaction in progress".to_string(),
                ))
            } else {
                Ok(outcome_for(sql))
            }
        });
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, session).await;

        connection.begin().await?;
        assert!(connection.transaction_open());
        assert_eq!(log.take(), vec!["COMMIT".to_string(), "BEGIN".to_string()]);
        Ok::<(), AdapterError>(())
    })?;
    Ok(())
}

#[test]
fn failed_begin_statement_propagates() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let session = MockSession::with_responder(log.clone(), |sql| {
            if sql == "BEGIN" {
                Err(AdapterError::DatabaseError(
                    "  could not serialize access  ".to_string(),
                ))
            } else {
                Ok(outcome_for(sql))
            }
        });
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, session).await;

        let error = connection.begin().await.unwrap_err();
        match error {
            AdapterError::DatabaseError(message) => {
                assert_eq!(message, "could not serialize access");
            }
            other => panic!("expected a database error, got {other:?}"),
        }
        assert!(!connection.transaction_open());
    });
    Ok(())
}

#[test]
fn failed_commit_rolls_back_and_surfaces_the_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let mut commits = 0;
        let session = MockSession::with_responder(log.clone(), move |sql| {
            if sql == "COMMIT" {
                commits += 1;
                if commits == 2 {
                    return Err(AdapterError::DatabaseError(
                        "deadlock detected during commit".to_string(),
                    ));
                }
            }
            Ok(outcome_for(sql))
        });
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, session).await;

        connection.begin().await?;
        log.take();

        let error = connection.commit().await.unwrap_err();
        assert!(matches!(error, AdapterError::DatabaseError(_)));
        assert_eq!(
            log.take(),
            vec!["COMMIT".to_string(), "ROLLBACK".to_string()],
            "the failed commit is rolled back"
        );
        assert!(!connection.transaction_open());
        Ok::<(), AdapterError>(())
    })?;
    Ok(())
}

#[test]
fn close_rolls_back_an_open_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let log = SessionLog::new();
        let mut connection = Connection::new("tx", Credentials::default());
        open_with_session(&mut connection, MockSession::ok(log.clone())).await;

        connection.begin().await?;
        log.take();

        connection.close().await;
        assert_eq!(log.take(), vec!["ROLLBACK".to_string()]);
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(!connection.transaction_open());
        Ok::<(), AdapterError>(())
    })?;
    Ok(())
}
