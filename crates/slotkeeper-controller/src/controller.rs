//! Async event loop tying keypad, display and locker together.
//!
//! The [`Controller`] awaits one key at a time and runs it to completion
//! (storage writes, screens and holds) before reading the next one. Keys
//! pressed while a message is held are read and dropped afterwards, never
//! queued.

use slotkeeper_core::Result;
use slotkeeper_hardware::{ByteStorage, DisplayDevice, Key, KeypadDevice};
use slotkeeper_storage::{Locker, PinGenerator};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::screen::Screen;
use crate::state_machine::{EntryStateMachine, Mode, Step};

/// Keypad-driven slot controller.
///
/// # Examples
///
/// ```no_run
/// use slotkeeper_controller::{Controller, ControllerConfig, VirtualDisplay};
/// use slotkeeper_hardware::{MemoryEeprom, VirtualKeypad};
///
/// # async fn example() -> slotkeeper_core::Result<()> {
/// let (keypad, handle) = VirtualKeypad::new();
/// let mut controller = Controller::boot(
///     keypad,
///     VirtualDisplay::default(),
///     MemoryEeprom::new(),
///     ControllerConfig::default(),
/// )?;
///
/// handle.send_keys("1").await.unwrap();
/// drop(handle);
///
/// // Returns once the keypad disconnects
/// controller.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Controller<K, D, S> {
    keypad: K,
    display: D,
    locker: Locker<S>,
    machine: EntryStateMachine,
    config: ControllerConfig,
}

impl<K, D, S> Controller<K, D, S>
where
    K: KeypadDevice,
    D: DisplayDevice,
    S: ByteStorage,
{
    /// Boot the locker from storage and show the first screen.
    ///
    /// The PIN generator is seeded from `config.seed` when set, otherwise
    /// from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns storage errors from booting the locker and device errors
    /// from the first render.
    pub fn boot(keypad: K, display: D, storage: S, config: ControllerConfig) -> Result<Self> {
        let generator = match config.seed {
            Some(seed) => {
                debug!("Seeding PIN generator with fixed seed");
                PinGenerator::from_seed(seed)
            }
            None => PinGenerator::from_entropy(),
        };

        let locker = Locker::boot(storage, generator)?;
        let machine = EntryStateMachine::new(config.master_code.clone(), locker.is_locked());

        let mut controller = Self {
            keypad,
            display,
            locker,
            machine,
            config,
        };

        info!("Controller started in {} mode", controller.machine.mode());
        let screen = controller.machine.current_screen(&controller.locker);
        controller.show(&screen)?;

        Ok(controller)
    }

    /// Process keys until the keypad disconnects.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error (storage, device, PIN space).
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.keypad.read_input().await {
                Ok(key) => self.process(key).await?,
                Err(e) if e.is_disconnected() => {
                    info!("Keypad disconnected, stopping controller");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Wait for one key and process it.
    pub async fn step(&mut self) -> Result<()> {
        let key = self.keypad.read_input().await?;
        self.process(key).await
    }

    /// Process a single key press to completion.
    pub async fn process(&mut self, key: Key) -> Result<()> {
        let steps = self.machine.handle_key(key, &mut self.locker)?;
        if steps.is_empty() {
            debug!("Key ignored in {} mode", self.mode());
        }

        for step in steps {
            match step {
                Step::Show(screen) => self.show(&screen)?,
                Step::Hold { screen, hold } => {
                    self.show(&screen)?;
                    tokio::time::sleep(self.config.hold_duration(hold)).await;
                    self.discard_pending()?;
                }
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn machine(&self) -> &EntryStateMachine {
        &self.machine
    }

    pub fn locker(&self) -> &Locker<S> {
        &self.locker
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Stop the controller, returning the storage device.
    pub fn into_storage(self) -> S {
        self.locker.into_storage()
    }

    fn show(&mut self, screen: &Screen) -> Result<()> {
        debug!("Showing {} screen", screen.name());
        for command in screen.render() {
            command.apply(&mut self.display)?;
        }
        self.display.flush()?;
        Ok(())
    }

    /// Drop keys pressed during a hold.
    fn discard_pending(&mut self) -> Result<()> {
        let mut discarded = 0usize;
        loop {
            match self.keypad.try_read_input() {
                Ok(Some(_)) => discarded += 1,
                Ok(None) => break,
                // Surfaces on the next read
                Err(e) if e.is_disconnected() => break,
                Err(e) => return Err(e.into()),
            }
        }

        if discarded > 0 {
            debug!("Discarded {} key(s) pressed during hold", discarded);
        }
        Ok(())
    }
}
