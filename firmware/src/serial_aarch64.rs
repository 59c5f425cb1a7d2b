//! PL011 UART console for EL3.
//!
//! The MMU is off while this runs, so the UART is accessed at its physical
//! address. The base comes from [`crate::platform_config::uart_base_phys`].
//! Output only: nothing at this boot stage reads from the console.

#![cfg(target_arch = "aarch64")]

use conquer_once::spin::OnceCell;
use core::fmt;
use spin::Mutex;

/// PL011 register offsets used by the console
mod reg {
    /// Data Register
    pub const DR: usize = 0x00;
    /// Flag Register (read-only)
    pub const FR: usize = 0x18;
    /// Control Register
    pub const CR: usize = 0x30;
}

/// Flag Register bits
mod flag {
    /// Transmit FIFO full
    pub const TXFF: u32 = 1 << 5;
}

/// Control Register bits
mod cr {
    /// UART enable
    pub const UARTEN: u32 = 1 << 0;
    /// Transmit enable
    pub const TXE: u32 = 1 << 8;
}

/// PL011 UART serial port.
pub struct SerialPort {
    base: usize,
}

impl SerialPort {
    pub const fn new(base: usize) -> Self {
        SerialPort { base }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write_reg(&self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Enable the transmitter. Baud rate and line settings are left as the
    /// previous boot stage programmed them.
    pub fn init(&mut self) {
        let cr = self.read_reg(reg::CR);
        self.write_reg(reg::CR, cr | cr::UARTEN | cr::TXE);
    }

    /// Send a single byte
    pub fn send(&mut self, byte: u8) {
        while (self.read_reg(reg::FR) & flag::TXFF) != 0 {
            core::hint::spin_loop();
        }
        self.write_reg(reg::DR, byte as u32);
    }
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.send(b'\r');
            }
            self.send(byte);
        }
        Ok(())
    }
}

static CONSOLE: OnceCell<Mutex<SerialPort>> = OnceCell::uninit();

/// Bring up the console at the configured base. Later calls are no-ops.
pub fn init_serial() {
    CONSOLE.get_or_init(|| {
        let mut port = SerialPort::new(crate::platform_config::uart_base_phys());
        port.init();
        Mutex::new(port)
    });
}

/// Whether [`init_serial`] has run.
pub fn is_initialized() -> bool {
    CONSOLE.get().is_some()
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;

    // Single CPU, interrupts masked at this stage: a plain lock is enough.
    if let Some(console) = CONSOLE.get() {
        let _ = console.lock().write_fmt(args);
    }
}

#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::serial_aarch64::_print(format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)));
}
