use clap::Args;
use tracing::error;
use tracing::info;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::HBRUSH;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::HSTRING;
use windows::core::w;

use crate::assets::AssetLocator;
use crate::command_line::parse_command_line;
use crate::debug_layer::print_dxgi_debug_messages;
use crate::frame_timer::FrameTime;
use crate::frame_timer::FrameTimer;
use crate::gfx_device::GfxDevice;
use crate::gfx_device::GfxDeviceParams;
use crate::gfx_error::GfxResult;
use crate::gfx_error::HResultExt;
use crate::gfx_error::warn_if_failed;
use crate::input::InputQueue;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::keys;
use crate::logging::init_logging;

/// A demo driven by [`run_demo`].
pub trait DemoApp: Sized {
    const TITLE: &'static str;

    /// Demo-specific command line options, flattened next to the common ones.
    type Args: Args;

    fn initialize(
        device: &mut GfxDevice,
        args: &Self::Args,
        assets: &AssetLocator,
    ) -> GfxResult<Self>;

    fn on_key_down(&mut self, _key: KeyCode) {}

    fn on_key_up(&mut self, _key: KeyCode) {}

    /// Records, submits and presents one frame.
    fn update(&mut self, device: &mut GfxDevice, time: FrameTime) -> GfxResult<()>;

    /// Releases everything the demo allocated from `device`.
    fn shutdown(&mut self, device: &mut GfxDevice) -> GfxResult<()>;
}

const WINDOW_CLASS: windows::core::PCWSTR = w!("GfxDemoWindowClass");

/// Runs `A` until its window closes. Errors from the frame loop stop the
/// demo, dump the DXGI debug messages and are returned after shutdown.
pub fn run_demo<A: DemoApp>(manifest_dir: &str) -> GfxResult<()> {
    init_logging()?;
    let command_line = parse_command_line::<A::Args>();
    let assets =
        AssetLocator::from_command_line(command_line.common.asset_dir.as_deref(), manifest_dir)?;
    info!("{} starting, assets in {}", A::TITLE, assets.root().display());

    let instance = unsafe { GetModuleHandleW(None) }.or_fail("GetModuleHandleW")?;
    let window_class = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.or_fail("LoadCursorW")?,
        lpszClassName: WINDOW_CLASS,
        hbrBackground: HBRUSH::default(),
        ..Default::default()
    };
    if unsafe { RegisterClassExW(&window_class) } == 0 {
        eyre::bail!("RegisterClassExW failed for {}", A::TITLE);
    }

    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: command_line.common.width as i32,
        bottom: command_line.common.height as i32,
    };
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false) }
        .or_fail("AdjustWindowRect")?;

    let title = window_title(A::TITLE, command_line.common.warp);

    // Boxed so the pointer stored in the window's user data stays put.
    let input = Box::new(InputQueue::default());
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            WINDOW_CLASS,
            &HSTRING::from(title.as_str()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None,
            None,
            Some(instance.into()),
            Some(&*input as *const InputQueue as *const _),
        )
    }
    .or_fail("CreateWindowExW")?;

    let params = GfxDeviceParams::from(&command_line.common);
    let mut device = match GfxDevice::new(&params, hwnd) {
        Ok(device) => device,
        Err(e) => {
            _ = unsafe { DestroyWindow(hwnd) };
            return Err(e);
        }
    };

    let mut app = match A::initialize(&mut device, &command_line.demo, &assets) {
        Ok(app) => app,
        Err(e) => {
            error!("{} failed to initialize: {e:?}", A::TITLE);
            print_dxgi_debug_messages(device.info_queue());
            warn_if_failed("Device shutdown after failed initialization", device.shutdown());
            _ = unsafe { DestroyWindow(hwnd) };
            return Err(e);
        }
    };

    unsafe { _ = ShowWindow(hwnd, SW_SHOW) };

    let result = frame_loop(&mut app, &mut device, hwnd, &input, &title);
    if let Err(e) = &result {
        error!("{} stopped: {e:?}", A::TITLE);
        print_dxgi_debug_messages(device.info_queue());
        _ = unsafe { DestroyWindow(hwnd) };
    }

    let idle = device.wait_for_gpu();
    let app_shutdown = app.shutdown(&mut device);
    let device_shutdown = device.shutdown();
    drop(device);
    drop(input);
    info!("{} exited", A::TITLE);

    result?;
    idle?;
    app_shutdown?;
    device_shutdown
}

fn frame_loop<A: DemoApp>(
    app: &mut A,
    device: &mut GfxDevice,
    hwnd: HWND,
    input: &InputQueue,
    title: &str,
) -> GfxResult<()> {
    let mut timer = FrameTimer::default();
    loop {
        let mut message = MSG::default();
        if unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.into() {
            unsafe {
                _ = TranslateMessage(&message);
                DispatchMessageW(&message);
            }
            if message.message == WM_QUIT {
                return Ok(());
            }
            continue;
        }

        for event in input.drain() {
            match event {
                KeyEvent::Down(keys::VK_ESCAPE) => {
                    unsafe { DestroyWindow(hwnd) }.or_fail("DestroyWindow")?;
                    return Ok(());
                }
                KeyEvent::Down(key) => app.on_key_down(key),
                KeyEvent::Up(key) => app.on_key_up(key),
            }
        }

        let time = timer.tick();
        app.update(device, time)?;

        if let Some(fps) = timer.take_fps() {
            let text = HSTRING::from(format!("{title} - {fps:.1} fps"));
            unsafe { SetWindowTextW(hwnd, &text) }.or_fail("SetWindowTextW")?;
        }
    }
}

fn window_title(title: &str, warp: bool) -> String {
    if warp {
        format!("{title} (WARP)")
    } else {
        title.to_string()
    }
}

extern "system" fn wndproc(window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if message == WM_CREATE {
        unsafe {
            let create_struct: &CREATESTRUCTW = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(window, GWLP_USERDATA, create_struct.lpCreateParams as _);
        }
        return LRESULT(0);
    }

    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    if user_data == 0 {
        // before WM_CREATE or after WM_DESTROY
        return unsafe { DefWindowProcW(window, message, wparam, lparam) };
    }
    // Safety: set from the boxed queue in run_demo, which outlives the window.
    let input = unsafe { &*(user_data as *const InputQueue) };

    match message {
        WM_KEYDOWN => {
            input.push(KeyEvent::Down(wparam.0 as KeyCode));
            LRESULT(0)
        }
        WM_KEYUP => {
            input.push(KeyEvent::Up(wparam.0 as KeyCode));
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe {
                SetWindowLongPtrW(window, GWLP_USERDATA, 0);
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(window, message, wparam, lparam) },
    }
}
