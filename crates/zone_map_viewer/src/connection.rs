use std::io::{BufRead, Write};
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use zone_map_proto::{MapClientMessage, MapServerMessage};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ConnectionStatus {
    Connecting,
    Connected,
    Error(String),
}

#[derive(Resource)]
pub(super) struct TransportState {
    pub(super) status: ConnectionStatus,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
        }
    }
}

/// Events forwarded from the connection thread to the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum TransportEvent {
    Connected,
    Message(MapServerMessage),
    /// An inbound line that failed to decode; dropped after logging.
    Malformed(String),
    Error(String),
}

/// Channel pair bridging the connection thread and the bevy schedule.
/// Dropping this resource closes the outbound channel and lets the writer
/// loop (and with it the connection) wind down.
#[derive(Resource)]
pub(super) struct TransportClient {
    pub(super) tx: Sender<MapClientMessage>,
    pub(super) rx: Mutex<Receiver<TransportEvent>>,
}

pub(super) fn setup_startup_state(
    mut commands: Commands,
    offline: Res<OfflineConfig>,
    config: Res<ViewerConfig>,
    calibration: Res<MapCalibration>,
) {
    if offline.offline {
        commands.insert_resource(TransportState {
            status: ConnectionStatus::Error("offline mode".to_string()),
        });
        return;
    }

    let (tx, rx) = spawn_transport_client(config.addr.clone(), calibration.init_message());
    commands.insert_resource(TransportClient {
        tx,
        rx: Mutex::new(rx),
    });
    commands.insert_resource(TransportState::default());
}

fn spawn_transport_client(
    addr: String,
    init: MapClientMessage,
) -> (Sender<MapClientMessage>, Receiver<TransportEvent>) {
    let (tx_out, rx_out) = mpsc::channel::<MapClientMessage>();
    let (tx_in, rx_in) = mpsc::channel::<TransportEvent>();

    thread::spawn(move || match TcpStream::connect(&addr) {
        Ok(stream) => {
            let _ = tx_in.send(TransportEvent::Connected);
            if let Err(err) = run_connection(stream, init, rx_out, tx_in.clone()) {
                let _ = tx_in.send(TransportEvent::Error(err));
            }
        }
        Err(err) => {
            let _ = tx_in.send(TransportEvent::Error(err.to_string()));
        }
    });

    (tx_out, rx_in)
}

fn run_connection(
    stream: TcpStream,
    init: MapClientMessage,
    rx_out: Receiver<MapClientMessage>,
    tx_in: Sender<TransportEvent>,
) -> Result<(), String> {
    stream.set_nodelay(true).map_err(|err| err.to_string())?;
    let reader_stream = stream.try_clone().map_err(|err| err.to_string())?;
    let mut writer = std::io::BufWriter::new(stream);

    // Calibration goes out exactly once per session, before anything else.
    send_message(&mut writer, &init)?;

    let reader_tx = tx_in;
    thread::spawn(move || read_messages(reader_stream, reader_tx));

    for message in rx_out {
        send_message(&mut writer, &message)?;
    }

    Ok(())
}

fn read_messages(stream: TcpStream, tx_in: Sender<TransportEvent>) {
    let mut reader = std::io::BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                let _ = tx_in.send(TransportEvent::Error("disconnected".to_string()));
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<MapServerMessage>(trimmed) {
                    Ok(message) => {
                        let _ = tx_in.send(TransportEvent::Message(message));
                    }
                    Err(err) => {
                        let _ = tx_in.send(TransportEvent::Malformed(err.to_string()));
                    }
                }
            }
            Err(err) => {
                let _ = tx_in.send(TransportEvent::Error(err.to_string()));
                break;
            }
        }
    }
}

fn send_message(
    writer: &mut std::io::BufWriter<TcpStream>,
    message: &MapClientMessage,
) -> Result<(), String> {
    serde_json::to_writer(&mut *writer, message).map_err(|err| err.to_string())?;
    writer.write_all(b"\n").map_err(|err| err.to_string())?;
    writer.flush().map_err(|err| err.to_string())?;
    Ok(())
}

/// Drains the inbound channel at the start of each frame, so every message
/// is applied before this frame's scene systems read the registry. Updates
/// to the same id land last-write-wins in delivery order.
pub(super) fn poll_transport_messages(
    state: Option<ResMut<TransportState>>,
    client: Option<Res<TransportClient>>,
    mut registry: ResMut<EntityRegistry>,
    mut zones: ResMut<ZoneStore>,
) {
    let Some(mut state) = state else {
        return;
    };
    let Some(client) = client else {
        return;
    };
    let receiver = match client.rx.lock() {
        Ok(receiver) => receiver,
        Err(_) => {
            state.status = ConnectionStatus::Error("transport receiver poisoned".to_string());
            return;
        }
    };

    loop {
        match receiver.try_recv() {
            Ok(TransportEvent::Connected) => {
                state.status = ConnectionStatus::Connected;
            }
            Ok(TransportEvent::Message(message)) => {
                apply_server_message(&mut registry, &mut zones, message);
            }
            Ok(TransportEvent::Malformed(detail)) => {
                warn!("dropping malformed transport message: {detail}");
            }
            Ok(TransportEvent::Error(message)) => {
                // Last-known entity positions stay on screen; only the
                // status line changes.
                state.status = ConnectionStatus::Error(message);
            }
            Err(mpsc::TryRecvError::Empty) => break,
            Err(mpsc::TryRecvError::Disconnected) => {
                if !matches!(state.status, ConnectionStatus::Error(_)) {
                    state.status = ConnectionStatus::Error("disconnected".to_string());
                }
                break;
            }
        }
    }
}

fn apply_server_message(
    registry: &mut EntityRegistry,
    zones: &mut ZoneStore,
    message: MapServerMessage,
) {
    match message {
        MapServerMessage::EntityMove { id, x, y } => {
            registry.upsert(&id, Vec2::new(x as f32, y as f32));
        }
        MapServerMessage::ZoneAnnounce { zone_id, vertices } => {
            if zones.get(&zone_id).is_some() {
                debug!("replacing zone {zone_id} from re-announce");
            }
            zones.insert(Zone::from_wire(zone_id, vertices));
        }
    }
}
