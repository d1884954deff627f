//! Full encounter flow: frames in, transcript out, enrichment after.
//!
//! Stands in for both collaborators with local stubs: an HTTP listener for
//! the token endpoint and a WebSocket listener for the streaming service.

use futures_util::{SinkExt, StreamExt};
use medscribe::audio::frame::AudioFrame;
use medscribe::config::{Config, StreamingConfig};
use medscribe::enrich::{Enricher, MockCompletionBackend, SentimentOutcome};
use medscribe::keyterms::Specialty;
use medscribe::session::EncounterSession;
use medscribe::stream::session::SessionState;
use medscribe::transcript::Speaker;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Serves one token request with a fixed temporary token.
async fn token_service(listener: TcpListener) {
    token_service_on(&listener).await;
}

async fn token_service_on(listener: &TcpListener) {
    let (mut stream, _) = listener.accept().await.expect("accept");
    let mut buf = [0u8; 2048];
    let _ = stream.read(&mut buf).await;

    let body = r#"{"token":"tmp-test-token"}"#;
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream
        .write_all(response.as_bytes())
        .await
        .expect("write response");
}

/// Streaming service stub: emits two turns as audio arrives, acknowledges
/// Terminate.
async fn streaming_service(listener: TcpListener) {
    streaming_service_on(&listener).await;
}

async fn streaming_service_on(listener: &TcpListener) {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = accept_async(stream).await.expect("handshake");

    ws.send(Message::Text(
        r#"{"type":"Begin","id":"e2e-session","expires_at":1700000000}"#.to_string(),
    ))
    .await
    .expect("begin");

    let scripted = [
        "Good morning, what brings you in today?",
        "I've had a cough for about two weeks.",
    ];
    let mut sent = 0usize;
    let mut bytes_received = 0usize;

    while let Some(Ok(msg)) = ws.next().await {
        match msg {
            Message::Binary(payload) => {
                bytes_received += payload.len();
                // One finalized turn per 8000 bytes (~250ms of audio)
                if sent < scripted.len() && bytes_received >= (sent + 1) * 8000 {
                    let turn = format!(
                        r#"{{"type":"Turn","transcript":"{}","turn_is_formatted":true,"end_of_turn":true}}"#,
                        scripted[sent]
                    );
                    ws.send(Message::Text(turn)).await.expect("turn");
                    sent += 1;
                }
            }
            Message::Text(text) if text.contains("Terminate") => {
                let termination = format!(
                    r#"{{"type":"Termination","audio_duration_seconds":{}}}"#,
                    bytes_received as f64 / 32000.0
                );
                ws.send(Message::Text(termination)).await.expect("termination");
                let _ = ws.close(None).await;
                break;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

fn test_config(ws_addr: std::net::SocketAddr, token_addr: std::net::SocketAddr) -> Config {
    Config {
        streaming: StreamingConfig {
            endpoint: format!("ws://{}/v3/ws", ws_addr),
            token_endpoint: format!("http://{}/v3/token", token_addr),
            api_key: "test-api-key".to_string(),
            ..StreamingConfig::default()
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn encounter_produces_transcript_and_enrichment() {
    let ws_listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ws");
    let token_listener = TcpListener::bind("127.0.0.1:0").await.expect("bind token");
    let ws_addr = ws_listener.local_addr().expect("ws addr");
    let token_addr = token_listener.local_addr().expect("token addr");

    let ws_server = tokio::spawn(streaming_service(ws_listener));
    let token_server = tokio::spawn(token_service(token_listener));

    let config = test_config(ws_addr, token_addr);
    let mut session = EncounterSession::new(config);

    session
        .start(Specialty::GeneralPractice, "peak flow")
        .await
        .expect("start");
    assert!(session.is_active());

    // Stream ~1.3s of 48kHz stereo audio; the converter downmixes and
    // resamples before chunking.
    for sequence in 0..15 {
        let frame = AudioFrame::new(sequence, vec![0.1f32; 4096 * 2], 48000, 2);
        session.push_frame(&frame);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // Wait for both scripted turns to arrive
    for _ in 0..100 {
        if session.snapshot().turns.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let transcript = session.finish().await;
    assert_eq!(session.state(), SessionState::Idle);

    assert_eq!(transcript.turns.len(), 2);
    assert_eq!(transcript.turns[0].speaker, Speaker::Clinician);
    assert_eq!(transcript.turns[1].speaker, Speaker::Patient);
    assert!(transcript.turns[1].text.contains("cough"));

    let rendered = transcript.render();
    assert!(rendered.starts_with("Doctor: Good morning"));
    assert!(rendered.contains("\n\nPatient: "));

    // Post-session enrichment over the finished transcript
    let backend = MockCompletionBackend::new()
        .with_response_for("SOAP", "## Subjective\nCough for two weeks.")
        .with_response_for("HIPAA", "Doctor: Good morning [PERSON_NAME].")
        .with_response_for(
            "sentiment",
            r#"{"turns":[],"patient_summary":"Mildly concerned.","overall_patient_sentiment":"NEUTRAL","overall_doctor_sentiment":"POSITIVE"}"#,
        );
    let enricher = Enricher::new(backend);
    let result = enricher
        .enrich(&rendered, Specialty::GeneralPractice, "")
        .await;

    assert!(result.soap_note.is_ready());
    assert!(result.redacted_transcript.is_ready());
    match result.sentiment.value().expect("sentiment ready") {
        SentimentOutcome::Parsed(report) => {
            assert_eq!(report.patient_summary, "Mildly concerned.");
        }
        SentimentOutcome::Unparsed { error, .. } => panic!("sentiment should parse: {error}"),
    }

    ws_server.await.expect("ws server");
    token_server.await.expect("token server");
}

#[tokio::test]
async fn session_can_restart_after_finish() {
    let ws_listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ws");
    let token_listener = TcpListener::bind("127.0.0.1:0").await.expect("bind token");
    let ws_addr = ws_listener.local_addr().expect("ws addr");
    let token_addr = token_listener.local_addr().expect("token addr");

    // Both stubs serve one connection per round
    let ws_server = tokio::spawn(async move {
        for _ in 0..2 {
            streaming_service_on(&ws_listener).await;
        }
    });
    let token_server = tokio::spawn(async move {
        for _ in 0..2 {
            token_service_on(&token_listener).await;
        }
    });

    let config = test_config(ws_addr, token_addr);
    let mut session = EncounterSession::new(config);

    // The same session object runs two encounters back to back
    for round in 0..2 {
        session
            .start(Specialty::Cardiology, "")
            .await
            .unwrap_or_else(|e| panic!("start round {round}: {e}"));
        assert!(session.is_active());

        let frame = AudioFrame::new(0, vec![0.1f32; 4096], 16000, 1);
        session.push_frame(&frame);

        let transcript = session.finish().await;
        assert_eq!(session.state(), SessionState::Idle);
        // The first round's turns must not leak into the second
        assert!(transcript.turns.len() <= 1);
    }

    ws_server.await.expect("ws server");
    token_server.await.expect("token server");
}
