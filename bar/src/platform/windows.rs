//! Windows platform implementation for the bar window
//!
//! Uses Win32 layered windows: the bar is a borderless, always-on-top,
//! non-activating strip whose pixels are pushed with `UpdateLayeredWindow`.
//! The fade opacity rides on the blend function's `SourceConstantAlpha`, so
//! fading never touches the pixel content itself.

use std::mem;
use std::ptr;

use tracing::debug;
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION, CreateCompatibleDC, CreateDIBSection,
    DIB_RGB_COLORS, DeleteDC, GetCurrentObject, GetDC, HBITMAP, HDC, OBJ_BITMAP, ReleaseDC,
    SelectObject, SetDIBits,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW, CS_VREDRAW, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetForegroundWindow, GetSystemMetrics, GetWindowRect, HTCLIENT, IDC_ARROW, LoadCursorW, MSG,
    PM_REMOVE, PeekMessageW, RegisterClassExW, SM_CXSCREEN, SM_CYSCREEN, SPI_GETWORKAREA,
    SPI_SETWORKAREA, SPIF_SENDCHANGE, SW_SHOWNOACTIVATE, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
    ShowWindow, SystemParametersInfoW, TranslateMessage, ULW_ALPHA, UpdateLayeredWindow, WM_CLOSE,
    WM_ERASEBKGND, WM_NCHITTEST, WM_QUIT, WNDCLASSEXW, WS_EX_LAYERED, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::PCWSTR;

use slat_core::ScreenRect;

use super::{BarPlatform, BarWindowConfig, PlatformError};
use crate::workarea::{WorkAreaOps, WorkAreaReservation};

/// Work-area access through `SystemParametersInfoW`.
pub struct Win32Desktop;

impl WorkAreaOps for Win32Desktop {
    fn work_area(&mut self) -> Result<ScreenRect, PlatformError> {
        let mut rect = RECT::default();
        unsafe {
            SystemParametersInfoW(
                SPI_GETWORKAREA,
                0,
                Some(&mut rect as *mut RECT as *mut _),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
            .map_err(|e| PlatformError::Other(format!("SPI_GETWORKAREA failed: {}", e)))?;
        }
        Ok(ScreenRect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn set_work_area(&mut self, area: ScreenRect) -> Result<(), PlatformError> {
        let mut rect = RECT {
            left: area.left,
            top: area.top,
            right: area.right,
            bottom: area.bottom,
        };
        unsafe {
            SystemParametersInfoW(
                SPI_SETWORKAREA,
                0,
                Some(&mut rect as *mut RECT as *mut _),
                SPIF_SENDCHANGE,
            )
            .map_err(|e| PlatformError::Other(format!("SPI_SETWORKAREA failed: {}", e)))?;
        }
        Ok(())
    }
}

/// Windows bar implementation
pub struct WindowsBar {
    hwnd: HWND,
    hdc_mem: HDC,
    width: u32,
    height: u32,
    screen_width: u32,
    screen_height: u32,
    pixel_data: Vec<u8>,
    bgra_buffer: Vec<u8>, // Pre-allocated buffer for RGBA->BGRA conversion
    content_dirty: bool,
    opacity: f32,
    alpha: u8, // opacity quantized to the blend function's range
    reservation: WorkAreaReservation<Win32Desktop>,
    running: bool,
}

// NOTE: WindowsBar intentionally does NOT implement Send.
// Win32 HWND handles must be used from the thread that created them; the
// whole application runs on a single thread anyway.

impl WindowsBar {
    fn register_class() -> Result<(), PlatformError> {
        unsafe {
            let class_name = wide_string("SlatBarClass");
            let hinstance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::Other(format!("GetModuleHandleW failed: {}", e)))?;

            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            let atom = RegisterClassExW(&wc);
            if atom == 0 {
                // Class may already be registered, which is fine
                let err = std::io::Error::last_os_error();
                if err.raw_os_error() != Some(1410) {
                    // ERROR_CLASS_ALREADY_EXISTS
                    return Err(PlatformError::Other(format!(
                        "RegisterClassExW failed: {}",
                        err
                    )));
                }
            }
        }
        Ok(())
    }

    fn create_dib_section(&mut self) -> Result<(), PlatformError> {
        unsafe {
            let hdc_screen = GetDC(HWND::default());

            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
            }

            self.hdc_mem = CreateCompatibleDC(hdc_screen);
            if self.hdc_mem.is_invalid() {
                ReleaseDC(HWND::default(), hdc_screen);
                return Err(PlatformError::BufferError(
                    "CreateCompatibleDC failed".to_string(),
                ));
            }

            let bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: self.width as i32,
                    biHeight: -(self.height as i32), // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };

            let mut bits: *mut std::ffi::c_void = ptr::null_mut();
            let hbitmap = CreateDIBSection(hdc_screen, &bmi, DIB_RGB_COLORS, &mut bits, None, 0)
                .map_err(|e| {
                    PlatformError::BufferError(format!("CreateDIBSection failed: {}", e))
                })?;

            SelectObject(self.hdc_mem, hbitmap);
            ReleaseDC(HWND::default(), hdc_screen);

            let size = (self.width * self.height * 4) as usize;
            self.pixel_data.resize(size, 0);
            self.bgra_buffer.resize(size, 0);
            self.content_dirty = true;
        }
        Ok(())
    }

    fn update_layered_window(&mut self) {
        // Skip the pixel push if neither content nor opacity changed
        if !self.content_dirty {
            return;
        }
        self.content_dirty = false;

        unsafe {
            let hdc_screen = GetDC(HWND::default());

            let bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: self.width as i32,
                    biHeight: -(self.height as i32),
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };

            // Convert RGBA to BGRA using the pre-allocated buffer
            for (i, chunk) in self.pixel_data.chunks(4).enumerate() {
                let offset = i * 4;
                if chunk.len() == 4 && offset + 3 < self.bgra_buffer.len() {
                    self.bgra_buffer[offset] = chunk[2]; // B
                    self.bgra_buffer[offset + 1] = chunk[1]; // G
                    self.bgra_buffer[offset + 2] = chunk[0]; // R
                    self.bgra_buffer[offset + 3] = chunk[3]; // A
                }
            }

            let hgdiobj = GetCurrentObject(self.hdc_mem, OBJ_BITMAP);
            let hbitmap = HBITMAP(hgdiobj.0);
            SetDIBits(
                self.hdc_mem,
                hbitmap,
                0,
                self.height,
                self.bgra_buffer.as_ptr() as *const _,
                &bmi,
                DIB_RGB_COLORS,
            );

            let pt_src = POINT { x: 0, y: 0 };
            let pt_dst = POINT { x: 0, y: 0 };
            let size = SIZE {
                cx: self.width as i32,
                cy: self.height as i32,
            };
            // SourceConstantAlpha carries the fade; per-pixel alpha stays on
            let blend = BLENDFUNCTION {
                BlendOp: 0, // AC_SRC_OVER
                BlendFlags: 0,
                SourceConstantAlpha: self.alpha,
                AlphaFormat: 1, // AC_SRC_ALPHA
            };

            let _ = UpdateLayeredWindow(
                self.hwnd,
                hdc_screen,
                Some(&pt_dst),
                Some(&size),
                self.hdc_mem,
                Some(&pt_src),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            ReleaseDC(HWND::default(), hdc_screen);
        }
    }
}

impl BarPlatform for WindowsBar {
    fn new(config: BarWindowConfig) -> Result<Self, PlatformError> {
        Self::register_class()?;

        let (screen_width, screen_height) = unsafe {
            (
                GetSystemMetrics(SM_CXSCREEN) as u32,
                GetSystemMetrics(SM_CYSCREEN) as u32,
            )
        };
        if screen_width == 0 || screen_height == 0 {
            return Err(PlatformError::Other(
                "GetSystemMetrics reported a zero-sized screen".to_string(),
            ));
        }

        let hwnd = unsafe {
            let class_name = wide_string("SlatBarClass");
            let window_name = wide_string(&config.namespace);
            let hinstance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::Other(format!("GetModuleHandleW failed: {}", e)))?;

            let ex_style = WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE;

            CreateWindowExW(
                ex_style,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(window_name.as_ptr()),
                WS_POPUP,
                0,
                0,
                screen_width as i32,
                config.height as i32,
                None,
                None,
                hinstance,
                None,
            )
            .map_err(|e| PlatformError::Other(format!("CreateWindowExW failed: {}", e)))?
        };

        let mut bar = Self {
            hwnd,
            hdc_mem: HDC::default(),
            width: screen_width,
            height: config.height,
            screen_width,
            screen_height,
            pixel_data: vec![0u8; (screen_width * config.height * 4) as usize],
            bgra_buffer: vec![0u8; (screen_width * config.height * 4) as usize],
            content_dirty: true, // Initial render needed
            opacity: 1.0,
            alpha: 255,
            reservation: WorkAreaReservation::new(Win32Desktop),
            running: true,
        };

        bar.create_dib_section()?;

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }
        debug!(hwnd = ?bar.hwnd, width = bar.width, height = bar.height, "bar window created");

        Ok(bar)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let alpha = (opacity * 255.0).round() as u8;
        self.opacity = opacity;
        if alpha == self.alpha {
            return;
        }
        self.alpha = alpha;
        self.content_dirty = true;
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn foreground_window_rect(&mut self) -> Option<ScreenRect> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.is_invalid() {
                return None;
            }
            let mut rect = RECT::default();
            GetWindowRect(hwnd, &mut rect).ok()?;
            Some(ScreenRect::new(rect.left, rect.top, rect.right, rect.bottom))
        }
    }

    fn reserve_work_area(&mut self) -> Result<(), PlatformError> {
        self.reservation.reserve(self.height)
    }

    fn restore_work_area(&mut self) -> Result<(), PlatformError> {
        self.reservation.restore()
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        self.content_dirty = true; // Assume caller will modify the buffer
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        self.update_layered_window();
    }

    fn poll_events(&mut self) -> bool {
        unsafe {
            let mut msg = MSG::default();
            // Drain the whole thread queue, not just our window: the tray
            // icon lives on a hidden window of its own on this thread
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    debug!(hwnd = ?self.hwnd, "WM_QUIT received");
                    self.running = false;
                    return false;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        self.running
    }
}

impl Drop for WindowsBar {
    fn drop(&mut self) {
        // The reservation field restores the work area when it drops after us
        unsafe {
            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
            }
            if !self.hwnd.is_invalid() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

/// Window procedure for the bar window
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // Only the tray Exit action ends the application
        WM_CLOSE => LRESULT(0),
        WM_NCHITTEST => LRESULT(HTCLIENT as isize),
        WM_ERASEBKGND => LRESULT(1), // Don't erase background
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Convert a &str to a null-terminated wide string
fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
