//! padlink firmware entry point.
//!
//! Brings up the S140 SoftDevice on an nRF52840, spawns the radio, LED,
//! button and motion tasks, then drives the [`PadController`] from a
//! single loop that interleaves link events with the supervision tick.

#![no_std]
#![no_main]

use core::mem;

use defmt::{debug, info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker, Timer};
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;

use padlink::ble::radio::{self, ChannelLinkDriver};
use padlink::ble::{LinkEvent, LinkRequest};
use padlink::config::{self, Board};
use padlink::keymap::{KeyAction, PadButton, StickDir};
use padlink::led::SignalIndicator;
use padlink::{
    button, led, CancelFlag, IndicatorMode, KeyEvent, KeySink, PadController, PeripheralIdentity,
    Timeouts,
};

/// Requests from the controller to the radio task.
static LINK_REQUESTS: Channel<CriticalSectionRawMutex, LinkRequest, 4> = Channel::new();
/// Events from the radio task to the controller loop.
static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, 8> = Channel::new();
/// Decoded key events for the motion consumer.
static KEY_EVENTS: Channel<CriticalSectionRawMutex, KeyEvent, 16> = Channel::new();
/// Indicator mode handoff to the LED task.
static INDICATOR: Signal<CriticalSectionRawMutex, IndicatorMode> = Signal::new();
/// Latched by the cancel button, polled by the controller.
static CANCEL: CancelFlag = CancelFlag::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice) -> ! {
    radio::radio_task(sd, LINK_REQUESTS.receiver(), LINK_EVENTS.sender()).await
}

#[embassy_executor::task]
async fn led_task(pin: AnyPin, active_low: bool) -> ! {
    led::led_task(pin, active_low, &INDICATOR).await
}

#[embassy_executor::task]
async fn button_task(pin: AnyPin) -> ! {
    button::cancel_task(pin, &CANCEL).await
}

/// Demo consumer: turns pad keys into logged motion commands, the way
/// the robot firmware dispatches them to its gait engine.
#[embassy_executor::task]
async fn motion_task() -> ! {
    loop {
        let ev = KEY_EVENTS.receive().await;
        match ev.action {
            KeyAction::Stick(StickDir::Up) => info!("gait: walk forward"),
            KeyAction::Stick(StickDir::Down) => info!("gait: walk backward"),
            KeyAction::Stick(StickDir::Left) => info!("gait: turn left"),
            KeyAction::Stick(StickDir::Right) => info!("gait: turn right"),
            KeyAction::Stick(StickDir::Center) => info!("gait: halt"),
            KeyAction::Click(PadButton::Menu) => info!("pose: home"),
            KeyAction::Click(PadButton::A) => info!("pose: greet"),
            KeyAction::Click(PadButton::B) => info!("gait: moonwalk"),
            _ => debug!("unmapped key {}", ev.code.as_str()),
        }
    }
}

/// Forwards controller key output into the motion queue. Drops on
/// overflow; key events are ephemeral.
struct ChannelKeySink;

impl KeySink for ChannelKeySink {
    fn on_key(&mut self, event: KeyEvent) {
        if KEY_EVENTS.try_send(event).is_err() {
            warn!("Key channel full - dropping event");
        }
    }
}

fn board_pins(p: embassy_nrf::Peripherals) -> (AnyPin, AnyPin) {
    match config::BOARD {
        Board::Nrf52840Dk => (p.P0_13.degrade(), p.P0_11.degrade()),
        Board::Nrf52840Dongle => (p.P0_06.degrade(), p.P1_06.degrade()),
        Board::E73Module => (p.P0_13.degrade(), p.P0_11.degrade()),
    }
}

fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("padlink starting");

    // SoftDevice reserves interrupt priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    // A bad target address is a configuration error; trap before the
    // radio comes up.
    let target = unwrap!(PeripheralIdentity::parse(config::TARGET_ADDR));
    info!("Target pad {}", target.display().as_str());

    let sd_config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 4,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 1,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: b"padlink" as *const u8 as _,
            current_len: 7,
            max_len: 7,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&sd_config);
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd)));

    let (led_pin, button_pin) = board_pins(p);
    unwrap!(spawner.spawn(led_task(led_pin, config::BOARD.led_active_low())));
    unwrap!(spawner.spawn(button_task(button_pin)));
    unwrap!(spawner.spawn(motion_task()));

    let driver = ChannelLinkDriver::new(LINK_REQUESTS.sender());
    let indicator = SignalIndicator::new(&INDICATOR);
    let mut pad = PadController::new(
        target,
        Timeouts::default(),
        driver,
        indicator,
        ChannelKeySink,
        &CANCEL,
    );

    pad.start(uptime_ms());

    let mut ticker = Ticker::every(Duration::from_millis(config::POLL_INTERVAL_MS));
    loop {
        match select(LINK_EVENTS.receive(), ticker.next()).await {
            Either::First(event) => pad.handle_event(event, uptime_ms()),
            Either::Second(()) => {
                if !pad.poll(uptime_ms()) {
                    break;
                }
            }
        }
    }

    if let Some(reason) = pad.stop_reason() {
        info!("Session over: {}", reason.describe());
    }

    // Let the radio task drain the shutdown requests before power is cut.
    Timer::after(Duration::from_millis(100)).await;

    info!("Powering down");
    unsafe {
        nrf_softdevice_s140::sd_power_system_off();
    }
    loop {
        cortex_m::asm::wfe();
    }
}
