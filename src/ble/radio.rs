//! Radio task - owns the SoftDevice and executes link requests.
//!
//! The controller never touches the SoftDevice: it queues
//! [`LinkRequest`]s through [`ChannelLinkDriver`] and this task turns
//! them into scan bursts, connect attempts and the notification run
//! loop, publishing everything that happens back as [`LinkEvent`]s.
//!
//! One request is serviced at a time; a request arriving mid-burst or
//! mid-connection interrupts the current work (dropping the SoftDevice
//! future cancels it).

use core::slice;

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{Duration, Timer};
use heapless::Vec;
use nrf_softdevice::ble::{central, gatt_client, Address, AddressType};
use nrf_softdevice::Softdevice;

use crate::ble::adv_parser::{decode_name, format_address};
use crate::ble::controller::LinkDriver;
use crate::ble::{LinkEvent, LinkRequest, PeerAddress, ADV_DATA_MAX, NOTIFY_DATA_MAX};
use crate::config;
use crate::error::LinkError;

/// GATT client for the pad's vendor key service: a single notify
/// characteristic carrying the raw key byte.
///
/// The value type must preserve the received length: a fixed-width
/// array value is zero-padded on receive, and the padded rendering
/// matches nothing in the key table.
#[nrf_softdevice::gatt_client(uuid = "fff0")]
struct PadKeyClient {
    #[characteristic(uuid = "fff1", notify)]
    key_code: Vec<u8, NOTIFY_DATA_MAX>,
}

/// Controller-side driver that queues requests for the radio task.
///
/// Never blocks: a full queue reports [`LinkError::QueueFull`] and the
/// supervisor's timeouts absorb the missed request.
pub struct ChannelLinkDriver {
    requests: Sender<'static, CriticalSectionRawMutex, LinkRequest, 4>,
}

impl ChannelLinkDriver {
    pub fn new(requests: Sender<'static, CriticalSectionRawMutex, LinkRequest, 4>) -> Self {
        Self { requests }
    }

    fn push(&self, request: LinkRequest) -> Result<(), LinkError> {
        self.requests
            .try_send(request)
            .map_err(|_| LinkError::QueueFull)
    }
}

impl LinkDriver for ChannelLinkDriver {
    fn start_scan(
        &mut self,
        window_us: u32,
        interval_us: u32,
        burst_ms: u32,
    ) -> Result<(), LinkError> {
        self.push(LinkRequest::StartScan {
            window_us,
            interval_us,
            burst_ms,
        })
    }

    fn stop_scan(&mut self) -> Result<(), LinkError> {
        self.push(LinkRequest::StopScan)
    }

    fn connect(&mut self, peer: &PeerAddress) -> Result<(), LinkError> {
        self.push(LinkRequest::Connect(*peer))
    }

    fn disconnect(&mut self) -> Result<(), LinkError> {
        self.push(LinkRequest::Disconnect)
    }

    fn set_radio_active(&mut self, active: bool) -> Result<(), LinkError> {
        self.push(LinkRequest::SetRadioActive(active))
    }
}

/// Radio task main loop.
pub async fn radio_task(
    sd: &'static Softdevice,
    requests: Receiver<'static, CriticalSectionRawMutex, LinkRequest, 4>,
    events: Sender<'static, CriticalSectionRawMutex, LinkEvent, 8>,
) -> ! {
    // Synthetic link id; the controller only needs identity, not the
    // SoftDevice's own connection handle.
    let mut handle_seq: u16 = 0;
    let mut pending: Option<LinkRequest> = None;

    loop {
        let request = match pending.take() {
            Some(r) => r,
            None => requests.receive().await,
        };
        match request {
            LinkRequest::StartScan {
                window_us,
                interval_us,
                burst_ms,
            } => {
                info!("BLE scan burst starting ({} ms)", burst_ms);
                match select(
                    run_scan_burst(sd, window_us, interval_us, burst_ms, &events),
                    requests.receive(),
                )
                .await
                {
                    Either::First(()) => {
                        events.send(LinkEvent::ScanDone).await;
                    }
                    Either::Second(LinkRequest::StopScan) => {
                        // A cancelled burst still ends: mirror the done
                        // event so the state machine sees the same flow
                        // as a natural expiry.
                        events.send(LinkEvent::ScanDone).await;
                    }
                    Either::Second(other) => {
                        pending = Some(other);
                    }
                }
            }
            LinkRequest::StopScan => {
                debug!("Stop-scan with no burst running");
            }
            LinkRequest::Connect(peer) => {
                handle_seq = handle_seq.wrapping_add(1);
                pending = run_connection(sd, peer, handle_seq, &requests, &events).await;
            }
            LinkRequest::Disconnect => {
                debug!("Disconnect with no link up");
            }
            LinkRequest::SetRadioActive(true) => {
                // The SoftDevice is enabled from boot; nothing to do.
            }
            LinkRequest::SetRadioActive(false) => {
                // The session is over. Park until main powers the
                // system off.
                info!("BLE radio down");
                loop {
                    Timer::after(Duration::from_secs(3600)).await;
                }
            }
        }
    }
}

/// One scan burst. Resolves when the burst duration expires; every
/// advertisement seen is forwarded as a [`LinkEvent::ScanResult`].
async fn run_scan_burst(
    sd: &Softdevice,
    window_us: u32,
    interval_us: u32,
    burst_ms: u32,
    events: &Sender<'static, CriticalSectionRawMutex, LinkEvent, 8>,
) {
    let config = central::ScanConfig {
        // Active scan so peripherals answer with their name record.
        active: true,
        // SoftDevice units: 625 us for window/interval, 10 ms for the
        // burst timeout.
        interval: interval_us / 625,
        window: window_us / 625,
        timeout: (burst_ms / 10) as u16,
        ..Default::default()
    };

    let result = central::scan(sd, &config, |params| -> Option<()> {
        let data =
            unsafe { slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
        let peer = PeerAddress {
            kind: params.peer_addr.addr_type(),
            bytes: params.peer_addr.addr,
        };
        debug!(
            "Found: {} ({})",
            format_address(&peer.bytes).as_str(),
            decode_name(data).unwrap_or("?")
        );

        let mut adv_data = Vec::new();
        let take = data.len().min(ADV_DATA_MAX);
        let _ = adv_data.extend_from_slice(&data[..take]);
        // Cannot await inside the SoftDevice callback; a full queue
        // drops the report and the next advertising interval repeats it.
        let _ = events.try_send(LinkEvent::ScanResult { peer, adv_data });
        None
    })
    .await;

    match result {
        Ok(()) => {}
        Err(central::ScanError::Timeout) => {}
        Err(_) => warn!("BLE scan burst ended with error"),
    }
}

/// Connect, subscribe and pump notifications until the link drops or a
/// new request interrupts. Returns the interrupting request, if any.
async fn run_connection(
    sd: &Softdevice,
    peer: PeerAddress,
    handle: u16,
    requests: &Receiver<'static, CriticalSectionRawMutex, LinkRequest, 4>,
    events: &Sender<'static, CriticalSectionRawMutex, LinkEvent, 8>,
) -> Option<LinkRequest> {
    info!("Connecting to {}", format_address(&peer.bytes).as_str());

    let addr = Address::new(address_kind(peer.kind), peer.bytes);
    let whitelist = [&addr];
    let mut connect_config = central::ConnectConfig::default();
    connect_config.scan_config.whitelist = Some(&whitelist);
    connect_config.scan_config.timeout = (config::CONNECT_TIMEOUT_MS / 10) as u16;

    let conn = match select(central::connect(sd, &connect_config), requests.receive()).await {
        Either::First(Ok(conn)) => conn,
        Either::First(Err(_)) => {
            warn!("Connect attempt failed");
            return None;
        }
        Either::Second(request) => {
            // Dropping the connect future aborts the attempt.
            return Some(request);
        }
    };

    let client: PadKeyClient = match gatt_client::discover(&conn).await {
        Ok(c) => c,
        Err(_) => {
            warn!("Key service not found on peer");
            return None;
        }
    };
    if client.key_code_cccd_write(true).await.is_err() {
        warn!("Could not subscribe to key notifications");
        return None;
    }

    info!("Link {} up", handle);
    events.send(LinkEvent::Connected { handle, peer }).await;

    let run = gatt_client::run(&conn, &client, |event| match event {
        // The notification value moves into the event unmodified, so
        // the client's value type and the event's payload type agree.
        PadKeyClientEvent::KeyCodeNotification(payload) => {
            // Drop on a full queue; keys are advisory, not queued work.
            let _ = events.try_send(LinkEvent::Notify { handle, payload });
        }
    });
    let interrupted = match select(run, requests.receive()).await {
        // The peer dropped the link (or supervision timed out).
        Either::First(_) => None,
        // Controller-requested disconnect: dropping `conn` closes it.
        Either::Second(LinkRequest::Disconnect) => None,
        Either::Second(other) => Some(other),
    };

    info!("Link {} down", handle);
    events.send(LinkEvent::Disconnected { handle, peer }).await;
    interrupted
}

fn address_kind(raw: u8) -> AddressType {
    match raw {
        0 => AddressType::Public,
        1 => AddressType::RandomStatic,
        2 => AddressType::RandomPrivateResolvable,
        3 => AddressType::RandomPrivateNonResolvable,
        _ => AddressType::Anonymous,
    }
}
