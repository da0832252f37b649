use bytes::Bytes;
use ferrous_doh_domain::PublicKeyPin;
use ferrous_doh_infrastructure::dns::transport::spki_sha256;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::BinEncodable;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

/// How the mock upstream answers each POST.
#[derive(Clone)]
pub enum DohBehavior {
    /// 200 with these answers, upstream id forced to 0 (RFC 8484 style).
    Answer(Vec<Record>),
    /// 200 with an A record `10.0.<id hi>.<id lo>` encoding the request id.
    EchoId,
    /// Given HTTP status with a text body.
    Status(u16),
    /// 200 with bytes that are not a DNS message.
    Garbage,
    /// Sleep, then answer like `Answer`.
    Delay(Duration, Vec<Record>),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub version: http::Version,
    pub body_len: usize,
}

struct ServerState {
    behavior: RwLock<DohBehavior>,
    requests: AtomicUsize,
    last_request: Mutex<Option<RecordedRequest>>,
}

pub struct MockDohServer {
    addr: SocketAddr,
    tls: bool,
    pin: PublicKeyPin,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDohServer {
    /// HTTPS upstream on 127.0.0.1 with a fresh self-signed certificate for `doh.test`.
    pub async fn start_tls(behavior: DohBehavior) -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["doh.test".to_string()]).unwrap();
        let pin_digest = spki_sha256(certified.cert.der()).unwrap();

        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
            certified.key_pair.serialize_der(),
        ));
        let mut tls_config = rustls::ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![certified.cert.der().clone()], key)
        .unwrap();
        tls_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        Self::start(
            behavior,
            Some(TlsAcceptor::from(Arc::new(tls_config))),
            PublicKeyPin::from_digest(pin_digest),
        )
        .await
    }

    /// Plain-HTTP upstream, for exercising the pipeline without TLS.
    pub async fn start_plain(behavior: DohBehavior) -> Self {
        Self::start(behavior, None, PublicKeyPin::from_digest([0u8; 32])).await
    }

    async fn start(behavior: DohBehavior, acceptor: Option<TlsAcceptor>, pin: PublicKeyPin) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let tls = acceptor.is_some();

        let state = Arc::new(ServerState {
            behavior: RwLock::new(behavior),
            requests: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        });

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let server_state = state.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let state = server_state.clone();
                        let acceptor = acceptor.clone();
                        tokio::spawn(async move {
                            match acceptor {
                                Some(acceptor) => {
                                    if let Ok(tls_stream) = acceptor.accept(stream).await {
                                        serve_connection(tls_stream, state).await;
                                    }
                                }
                                None => serve_connection(stream, state).await,
                            }
                        });
                    }
                }
            }
        });

        Self {
            addr,
            tls,
            pin,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}/dns-query", scheme, self.addr)
    }

    /// Pin of the server certificate's public key.
    pub fn pin(&self) -> PublicKeyPin {
        self.pin
    }

    pub fn set_behavior(&self, behavior: DohBehavior) {
        *self.state.behavior.write().unwrap() = behavior;
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last_request.lock().unwrap().clone()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDohServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_connection<S>(io: S, state: Arc<ServerState>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |req| handle(req, state.clone()));
    let _ = auto::Builder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(io), service)
        .await;
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let header = |name: http::header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let mut recorded = RecordedRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        content_type: header(http::header::CONTENT_TYPE),
        accept: header(http::header::ACCEPT),
        version: req.version(),
        body_len: 0,
    };

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return Ok(status_response(400)),
    };
    recorded.body_len = body.len();
    *state.last_request.lock().unwrap() = Some(recorded);

    let behavior = state.behavior.read().unwrap().clone();
    let response = match behavior {
        DohBehavior::Answer(records) => dns_response(answer(&body, |_| records.clone())),
        DohBehavior::EchoId => dns_response(answer(&body, |request| {
            let [hi, lo] = request.id().to_be_bytes();
            let name = request.queries()[0].name().clone();
            vec![Record::from_rdata(
                name,
                60,
                RData::A(A(Ipv4Addr::new(10, 0, hi, lo))),
            )]
        })),
        DohBehavior::Status(code) => status_response(code),
        DohBehavior::Garbage => dns_response(vec![0xde, 0xad, 0xbe, 0xef]),
        DohBehavior::Delay(delay, records) => {
            tokio::time::sleep(delay).await;
            dns_response(answer(&body, |_| records.clone()))
        }
    };
    Ok(response)
}

fn answer(body: &[u8], records: impl FnOnce(&Message) -> Vec<Record>) -> Vec<u8> {
    let Ok(request) = Message::from_vec(body) else {
        return vec![];
    };
    let answers = records(&request);

    let mut response = Message::new();
    response
        .set_id(0)
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);
    response.add_queries(request.queries().iter().cloned());
    response.add_answers(answers);
    response.to_vec().unwrap()
}

fn dns_response(bytes: Vec<u8>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/dns-message")
        .body(Full::new(Bytes::from(bytes)))
        .unwrap()
}

fn status_response(code: u16) -> Response<Full<Bytes>> {
    Response::builder()
        .status(code)
        .header(http::header::CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from_static(b"upstream unhappy")))
        .unwrap()
}
