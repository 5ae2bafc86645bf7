use std::{path::PathBuf, thread};

use clap::{crate_description, crate_version, AppSettings, Clap};
use okto_base::{
    keypad::{Key, KeyState},
    machine::{Machine, MachineError},
    runner::{ControlEvent, MachineEvent, RunnerOptions, Sender},
    screen::Screen,
};
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{self, EnvFilter};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

/// RGBA color for the pixel on-state
const COLOR_PIXEL_ON: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
/// RGBA color for the pixel off-state
const COLOR_PIXEL_OFF: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// Logical pixels per machine pixel.
const WINDOW_SCALE: u32 = 10;

trait TryIntoKey {
    type Error;

    fn try_into_key(&self) -> Result<Key, Self::Error>;
}

impl TryIntoKey for VirtualKeyCode {
    type Error = ();

    /// The classic 4x4 mapping onto the left of a QWERTY layout.
    fn try_into_key(&self) -> Result<Key, Self::Error> {
        use VirtualKeyCode::*;

        match *self {
            // row 1
            Key1 => Ok(Key::K1),
            Key2 => Ok(Key::K2),
            Key3 => Ok(Key::K3),
            Key4 => Ok(Key::KC),
            // row 2
            Q => Ok(Key::K4),
            W => Ok(Key::K5),
            E => Ok(Key::K6),
            R => Ok(Key::KD),
            // row 3
            A => Ok(Key::K7),
            S => Ok(Key::K8),
            D => Ok(Key::K9),
            F => Ok(Key::KE),
            // row 4
            Z => Ok(Key::KA),
            X => Ok(Key::K0),
            C => Ok(Key::KB),
            V => Ok(Key::KF),
            _ => Err(()),
        }
    }
}

trait IntoKeyState {
    fn into_key_state(&self) -> KeyState;
}

impl IntoKeyState for ElementState {
    fn into_key_state(&self) -> KeyState {
        match *self {
            ElementState::Pressed => KeyState::Pressed,
            ElementState::Released => KeyState::Released,
        }
    }
}

#[derive(Debug, Clap)]
#[clap(
    version = crate_version!(),
    about = crate_description!(),
    setting = AppSettings::ColoredHelp
)]
struct CliOpts {
    /// The path to the file containing the ROM.
    /// The file's contents will be loaded into the emulator's memory,
    /// starting at address 0x200.
    rom_file: PathBuf,
    /// Target instruction rate of the machine. The timers always run at
    /// 60Hz, independently of this.
    #[clap(short, long, default_value = "700")]
    instructions_per_second: u32,
}

fn main() -> Result<(), pixels::Error> {
    let cli_opts = CliOpts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let program = std::fs::read(&cli_opts.rom_file).expect("could not read ROM file");
    let machine = Machine::builder()
        .rom(&program)
        .expect("could not load ROM")
        .build();

    let event_loop = EventLoop::<MachineEvent>::with_user_event();

    let window_size = LogicalSize::new(
        Screen::WIDTH as u32 * WINDOW_SCALE,
        Screen::HEIGHT as u32 * WINDOW_SCALE,
    );
    let window = WindowBuilder::new()
        .with_title("okto")
        .with_inner_size(window_size)
        .with_min_inner_size(LogicalSize::new(Screen::WIDTH as u32, Screen::HEIGHT as u32))
        .build(&event_loop)
        .expect("could not create window");

    let surface_size = window.inner_size();
    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut pixels = Pixels::new(
        Screen::WIDTH as u32,
        Screen::HEIGHT as u32,
        surface_texture,
    )?;

    let mut screen = *machine.screen();
    let (control_event_sender, machine_event_receiver, machine_join_handle) = machine
        .start_with_options(RunnerOptions {
            instructions_per_second: cli_opts.instructions_per_second,
        });

    let mut control_event_sender = Some(control_event_sender);
    let mut machine_join_handle = Some(machine_join_handle);

    let event_loop_proxy = event_loop.create_proxy();
    thread::Builder::new()
        .name("machine event forwarder".to_owned())
        .spawn(move || loop {
            let event = match machine_event_receiver.recv() {
                Ok(event) => event,
                Err(_) => break, // machine stopped, nothing left to forward
            };
            match event_loop_proxy.send_event(event) {
                Ok(()) => (),
                Err(_) => break, // event loop closed
            }
        })
        .expect("could not spawn machine event forwarder thread");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => pixels.resize_surface(size.width, size.height),
                WindowEvent::CloseRequested => {
                    stop_machine(&mut control_event_sender, &mut machine_join_handle);
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::KeyboardInput {
                    input:
                        winit::event::KeyboardInput {
                            state,
                            virtual_keycode: Some(virtual_keycode),
                            ..
                        },
                    ..
                } => {
                    debug!(?virtual_keycode, ?state, "key state changed");
                    if virtual_keycode == VirtualKeyCode::Escape && state == ElementState::Pressed {
                        info!("escape pressed, exiting");
                        stop_machine(&mut control_event_sender, &mut machine_join_handle);
                        *control_flow = ControlFlow::Exit;
                    } else if let Ok(key) = virtual_keycode.try_into_key() {
                        if let Some(sender) = control_event_sender.as_ref() {
                            sender
                                .send(ControlEvent::KeyStateChange {
                                    key,
                                    new_state: state.into_key_state(),
                                })
                                .expect("machine stopped due to error or panic");
                        }
                    }
                }
                _ => (),
            },
            Event::UserEvent(MachineEvent::ScreenUpdate { screen: new_screen }) => {
                screen = new_screen;
                window.request_redraw();
            }
            Event::UserEvent(MachineEvent::SoundStateChange { active }) => {
                // Audio output is out of scope; the state is only observed.
                info!(active, "sound state changed");
            }
            Event::UserEvent(MachineEvent::ErrorEncountered { error }) => {
                error!(%error, "machine halted");
                stop_machine(&mut control_event_sender, &mut machine_join_handle);
                *control_flow = ControlFlow::Exit;
            }
            Event::RedrawRequested(_) => {
                pixels
                    .get_frame()
                    .chunks_exact_mut(4)
                    .zip(screen.pixels())
                    .for_each(|(frame_pixel, pixel_on)| {
                        frame_pixel.copy_from_slice(if pixel_on {
                            &COLOR_PIXEL_ON
                        } else {
                            &COLOR_PIXEL_OFF
                        });
                    });
                if let Err(render_error) = pixels.render() {
                    error!(%render_error, "could not draw the pixel buffer");
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => (),
        }
    });
}

/// Stop the running machine: dropping the control sender ends its loop,
/// joining surfaces a halt error if there was one.
fn stop_machine(
    control_event_sender: &mut Option<Sender<ControlEvent>>,
    machine_join_handle: &mut Option<thread::JoinHandle<Result<(), MachineError>>>,
) {
    drop(control_event_sender.take());
    if let Some(join_handle) = machine_join_handle.take() {
        match join_handle.join() {
            Ok(Ok(())) => (),
            Ok(Err(error)) => warn!(%error, "machine stopped on an error"),
            Err(_) => error!("machine thread panicked"),
        }
    }
}
