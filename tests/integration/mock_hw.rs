//! Mock driver adapters for integration tests.
//!
//! Every port call is appended to one shared [`CallLog`] so tests can
//! assert on the full driver history (including teardown order) without
//! touching ESP-IDF.  Each mock can be told to fail at a given stage.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use korvo_bsp::board::{Board, BoardParts, BoardPorts};
use korvo_bsp::config::BoardConfig;
use korvo_bsp::error::EspCode;
use korvo_bsp::ports::{
    AdcButtonConfig, BackendKind, BusDriver, ButtonFactory, ButtonHandle, Capacity, CodecDevice,
    CodecDeviceConfig, CodecFactory, CodecIf, CtrlIf, DataIf, Direction, Es7210Config,
    Es8311Config, GpioIf, I2cCtrlConfig, IndicatorConfig, IndicatorFactory, IndicatorHandle,
    MicSelect, MountBackend, RawHandle, StreamProvider,
};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Configure(&'static str),
    Install(&'static str),
    Delete(&'static str),
    StreamInit,
    NewCtrl { addr: u8 },
    NewGpio,
    NewEs8311 { pa_pin: i32, pa_voltage: f32 },
    NewEs7210 { mics: MicSelect },
    NewDevice(Direction),
    DeleteDevice,
    DeleteCodec,
    DeleteGpio,
    DeleteCtrl,
    CreateButton { index: u8, adc_unit: Option<RawHandle>, min_mv: u16, max_mv: u16 },
    DeleteButton,
    CreateIndicator { leds: u32, lists: usize },
    DeleteIndicator,
    Mount(BackendKind),
    Capacity(BackendKind),
    Unmount(BackendKind),
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<HwCall>>>);

#[allow(dead_code)]
impl CallLog {
    pub fn push(&self, call: HwCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&HwCall) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Calls recorded since `mark` (a previous `len()`).
    pub fn since(&self, mark: usize) -> Vec<HwCall> {
        self.0.lock().unwrap()[mark..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

fn handle(raw: usize) -> RawHandle {
    RawHandle::new(raw).unwrap()
}

// ── Bus ───────────────────────────────────────────────────────

pub struct MockBus {
    log: CallLog,
    name: &'static str,
    pub fail_configure: Option<EspCode>,
    pub fail_install: Option<EspCode>,
    pub fail_delete: Option<EspCode>,
    unit: Option<RawHandle>,
    installed: bool,
}

pub const ADC_UNIT: usize = 0xADC0;

impl MockBus {
    pub fn new(log: &CallLog, name: &'static str, unit: Option<usize>) -> Self {
        Self {
            log: log.clone(),
            name,
            fail_configure: None,
            fail_install: None,
            fail_delete: None,
            unit: unit.map(handle),
            installed: false,
        }
    }
}

impl BusDriver for MockBus {
    fn configure(&mut self) -> Result<(), EspCode> {
        self.log.push(HwCall::Configure(self.name));
        self.fail_configure.map_or(Ok(()), Err)
    }

    fn install(&mut self) -> Result<(), EspCode> {
        self.log.push(HwCall::Install(self.name));
        self.fail_install.map_or(Ok(()), Err)?;
        self.installed = true;
        Ok(())
    }

    fn delete(&mut self) -> Result<(), EspCode> {
        self.log.push(HwCall::Delete(self.name));
        self.fail_delete.map_or(Ok(()), Err)?;
        self.installed = false;
        Ok(())
    }

    fn handle(&self) -> Option<RawHandle> {
        if self.installed { self.unit } else { None }
    }
}

// ── Streams ───────────────────────────────────────────────────

pub const SPK_DATA: usize = 0x5000;
pub const MIC_DATA: usize = 0x5100;

pub struct MockStreams {
    log: CallLog,
    up: bool,
    pub fail_init: Option<EspCode>,
    /// Direction left without an interface after a successful init.
    pub missing: Option<Direction>,
}

impl MockStreams {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            up: false,
            fail_init: None,
            missing: None,
        }
    }
}

impl StreamProvider for MockStreams {
    fn data_if(&self, dir: Direction) -> Option<DataIf> {
        if !self.up || self.missing == Some(dir) {
            return None;
        }
        Some(DataIf(handle(match dir {
            Direction::Out => SPK_DATA,
            Direction::In => MIC_DATA,
        })))
    }

    fn init(&mut self) -> Result<(), EspCode> {
        self.log.push(HwCall::StreamInit);
        self.fail_init.map_or(Ok(()), Err)?;
        self.up = true;
        Ok(())
    }
}

// ── Codecs ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecStage {
    Ctrl,
    Gpio,
    Codec,
    Device,
}

pub struct MockCodecs {
    log: CallLog,
    pub fail_at: Option<CodecStage>,
    next: usize,
    live: HashSet<usize>,
}

#[allow(dead_code)]
impl MockCodecs {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_at: None,
            next: 0x1000,
            live: HashSet::new(),
        }
    }

    /// Objects created and not yet deleted.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    fn alloc(&mut self, stage: CodecStage) -> Option<RawHandle> {
        if self.fail_at == Some(stage) {
            return None;
        }
        self.next += 0x10;
        self.live.insert(self.next);
        Some(handle(self.next))
    }

    fn free(&mut self, h: RawHandle) {
        assert!(self.live.remove(&h.get()), "double delete of {:#x}", h.get());
    }
}

impl CodecFactory for MockCodecs {
    fn new_i2c_ctrl(&mut self, cfg: &I2cCtrlConfig) -> Option<CtrlIf> {
        self.log.push(HwCall::NewCtrl { addr: cfg.addr });
        self.alloc(CodecStage::Ctrl).map(CtrlIf)
    }

    fn new_gpio(&mut self) -> Option<GpioIf> {
        self.log.push(HwCall::NewGpio);
        self.alloc(CodecStage::Gpio).map(GpioIf)
    }

    fn new_es8311(&mut self, cfg: &Es8311Config<'_>) -> Option<CodecIf> {
        assert!(self.live.contains(&cfg.ctrl.0.get()));
        assert!(self.live.contains(&cfg.gpio.0.get()));
        self.log.push(HwCall::NewEs8311 {
            pa_pin: cfg.pa_pin,
            pa_voltage: cfg.hw_gain.pa_voltage,
        });
        self.alloc(CodecStage::Codec).map(CodecIf)
    }

    fn new_es7210(&mut self, cfg: &Es7210Config<'_>) -> Option<CodecIf> {
        assert!(self.live.contains(&cfg.ctrl.0.get()));
        self.log.push(HwCall::NewEs7210 {
            mics: cfg.mic_selected,
        });
        self.alloc(CodecStage::Codec).map(CodecIf)
    }

    fn new_device(&mut self, cfg: &CodecDeviceConfig<'_>) -> Option<CodecDevice> {
        assert!(self.live.contains(&cfg.codec.0.get()));
        self.log.push(HwCall::NewDevice(cfg.direction));
        self.alloc(CodecStage::Device).map(CodecDevice)
    }

    fn delete_device(&mut self, dev: CodecDevice) {
        self.log.push(HwCall::DeleteDevice);
        self.free(dev.0);
    }

    fn delete_codec(&mut self, codec: CodecIf) {
        self.log.push(HwCall::DeleteCodec);
        self.free(codec.0);
    }

    fn delete_ctrl(&mut self, ctrl: CtrlIf) {
        self.log.push(HwCall::DeleteCtrl);
        self.free(ctrl.0);
    }

    fn delete_gpio(&mut self, gpio: GpioIf) {
        self.log.push(HwCall::DeleteGpio);
        self.free(gpio.0);
    }
}

// ── Buttons ───────────────────────────────────────────────────

pub struct MockButtons {
    log: CallLog,
    /// Zero-based create call that returns no handle.
    pub fail_at: Option<usize>,
    /// Code returned by every delete call.
    pub fail_delete: Option<EspCode>,
    creates: usize,
    pub live: usize,
}

impl MockButtons {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_at: None,
            fail_delete: None,
            creates: 0,
            live: 0,
        }
    }
}

impl ButtonFactory for MockButtons {
    fn create_adc_button(&mut self, cfg: &AdcButtonConfig) -> Option<ButtonHandle> {
        self.log.push(HwCall::CreateButton {
            index: cfg.button_index,
            adc_unit: cfg.adc_unit,
            min_mv: cfg.min_mv,
            max_mv: cfg.max_mv,
        });
        let n = self.creates;
        self.creates += 1;
        if self.fail_at == Some(n) {
            return None;
        }
        self.live += 1;
        Some(ButtonHandle(handle(0xB000 + n)))
    }

    fn delete_button(&mut self, _button: ButtonHandle) -> Result<(), EspCode> {
        self.log.push(HwCall::DeleteButton);
        if let Some(rc) = self.fail_delete {
            return Err(rc);
        }
        self.live -= 1;
        Ok(())
    }
}

// ── Indicators ────────────────────────────────────────────────

pub struct MockIndicators {
    log: CallLog,
    pub fail: bool,
    pub live: usize,
}

impl MockIndicators {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
            live: 0,
        }
    }
}

impl IndicatorFactory for MockIndicators {
    fn create(&mut self, cfg: &IndicatorConfig) -> Option<IndicatorHandle> {
        self.log.push(HwCall::CreateIndicator {
            leds: cfg.strip.max_leds,
            lists: cfg.blink_lists.len(),
        });
        if self.fail {
            return None;
        }
        self.live += 1;
        Some(IndicatorHandle(handle(0x1ED0)))
    }

    fn delete(&mut self, _indicator: IndicatorHandle) -> Result<(), EspCode> {
        self.log.push(HwCall::DeleteIndicator);
        self.live -= 1;
        Ok(())
    }
}

// ── Filesystems ───────────────────────────────────────────────

pub struct MockFs {
    log: CallLog,
    kind: BackendKind,
    path: &'static str,
    pub fail_mount: Option<EspCode>,
    pub fail_capacity: Option<EspCode>,
    pub fail_unmount: Option<EspCode>,
}

impl MockFs {
    pub fn new(log: &CallLog, kind: BackendKind, path: &'static str) -> Self {
        Self {
            log: log.clone(),
            kind,
            path,
            fail_mount: None,
            fail_capacity: None,
            fail_unmount: None,
        }
    }
}

impl MountBackend for MockFs {
    type Handle = u32;

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn path(&self) -> &str {
        self.path
    }

    fn mount(&mut self) -> Result<u32, EspCode> {
        self.log.push(HwCall::Mount(self.kind));
        self.fail_mount.map_or(Ok(1), Err)
    }

    fn capacity(&mut self, _handle: &u32) -> Result<Capacity, EspCode> {
        self.log.push(HwCall::Capacity(self.kind));
        self.fail_capacity.map_or(
            Ok(Capacity {
                total: 1 << 20,
                used: 4096,
            }),
            Err,
        )
    }

    fn unmount(&mut self, handle: u32) -> Result<(), (EspCode, u32)> {
        self.log.push(HwCall::Unmount(self.kind));
        match self.fail_unmount {
            Some(rc) => Err((rc, handle)),
            None => Ok(()),
        }
    }
}

// ── Board assembly ────────────────────────────────────────────

pub struct MockPorts;

impl BoardPorts for MockPorts {
    type ControlBus = MockBus;
    type Adc = MockBus;
    type Streams = MockStreams;
    type Codecs = MockCodecs;
    type Buttons = MockButtons;
    type Indicators = MockIndicators;
    type Flash = MockFs;
    type Card = MockFs;
}

/// Healthy parts; tweak fields before building the board.
pub fn mock_parts(log: &CallLog) -> BoardParts<MockPorts> {
    BoardParts {
        control_bus: MockBus::new(log, "i2c", None),
        adc: MockBus::new(log, "adc", Some(ADC_UNIT)),
        streams: MockStreams::new(log),
        codecs: MockCodecs::new(log),
        buttons: MockButtons::new(log),
        indicators: MockIndicators::new(log),
        flash: MockFs::new(log, BackendKind::EmbeddedPartition, "/spiffs"),
        card: MockFs::new(log, BackendKind::RemovableCard, "/sdcard"),
    }
}

pub fn board_from(parts: BoardParts<MockPorts>) -> Board<MockPorts> {
    Board::new(BoardConfig::default(), parts).expect("default config is valid")
}

#[allow(dead_code)]
pub fn mock_board() -> (Board<MockPorts>, CallLog) {
    let log = CallLog::default();
    (board_from(mock_parts(&log)), log)
}
