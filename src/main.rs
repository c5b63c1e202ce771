use canvas::Surface;
use gloo_timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use yew::{events::MouseEvent, prelude::*};

mod canvas;
mod command;
mod convert;
mod editing;
mod error;
mod interaction;
mod mapping;
mod midi;
mod notes;
mod playback;
mod project;
mod settings;
mod simplify;
mod sketchpad;
mod util;
mod views;

use command::{Command, Outcome};
use error::SketchError;
use mapping::{time_to_x, CanvasSize};
use midi::MidiSynth;
use playback::{Admission, AudioGate, PlayRequest, SynthEngine};
use sketchpad::Sketchpad;
use util::relative_mouse_pos;

const PLAYHEAD_TICK_MS: u32 = 30;

pub enum Msg {
    Command(Command),
    CanvasMouseDown(MouseEvent),
    CanvasMouseMove(MouseEvent),
    CanvasMouseUp,
    EnableAudio,
    EngineReady(MidiSynth),
    EngineFailed(SketchError),
    TickPlayhead,
}

/// Engine times spanned by everything scheduled since playback started.
#[derive(Clone, Copy)]
struct Playhead {
    start: f64,
    end: f64,
}

pub struct Model {
    sketchpad: Sketchpad,
    audio: AudioGate<MidiSynth>,
    canvas: NodeRef,
    playhead: Option<Playhead>,
    tick_interval: Option<Interval>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            sketchpad: Sketchpad::new(CanvasSize::default()),
            audio: AudioGate::Idle,
            canvas: NodeRef::default(),
            playhead: None,
            tick_interval: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Command(command) => self.run(ctx, command),
            Msg::CanvasMouseDown(event) => {
                let (x, y) = relative_mouse_pos(&event);
                self.run(ctx, Command::PointerDown(x, y))
            }
            Msg::CanvasMouseMove(event) => {
                let (x, y) = relative_mouse_pos(&event);
                self.run(ctx, Command::PointerMove(x, y))
            }
            Msg::CanvasMouseUp => self.run(ctx, Command::PointerUp),
            Msg::EnableAudio => {
                if self.audio.warm_up() {
                    self.initialize_audio(ctx);
                }

                true
            }
            Msg::EngineReady(synth) => {
                let queued = self.audio.open(synth);

                for request in queued {
                    self.start_playback(ctx, request);
                }

                true
            }
            Msg::EngineFailed(err) => {
                log::error!("audio unavailable: {}", err);
                self.audio.fail();
                true
            }
            Msg::TickPlayhead => {
                let now = match self.audio.engine_mut() {
                    Some(engine) => engine.current_time(),
                    None => return false,
                };

                if self.playhead.map_or(true, |playhead| now >= playhead.end) {
                    self.stop_playhead();
                }

                true
            }
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        let element = match self.canvas.cast::<HtmlCanvasElement>() {
            Some(element) => element,
            None => return,
        };

        if first_render {
            let available = element
                .parent_element()
                .map(|parent| parent.client_width() as f64)
                .unwrap_or_default();
            let canvas = self.sketchpad.canvas();

            // Shrink to fit narrow windows; never grow past the default.
            if available > 0.0 && available < canvas.width {
                let size = CanvasSize::new(available, canvas.height);
                ctx.link().send_message(Msg::Command(Command::ResizeCanvas(size)));
            }
        }

        let context = element
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok());

        let mut context = match context {
            Some(context) => context,
            None => return,
        };

        self.sketchpad.render(&mut context);

        if let Some(x) = self.playhead_x() {
            let height = self.sketchpad.canvas().height;
            context.line((x, 0.0), (x, height), "#e91e63", 2.0);
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div id="app" class="v-box">
                { self.view_top_bar(ctx) }
                <div class="h-box">
                    { self.view_canvas(ctx) }
                    <div class="v-box frame">
                        { self.view_curve_panel(ctx) }
                        { self.view_edit_panel(ctx) }
                        { self.view_palette(ctx) }
                    </div>
                </div>
                { self.view_tracks(ctx) }
            </div>
        }
    }
}

impl Model {
    fn run(&mut self, ctx: &Context<Self>, command: Command) -> bool {
        match self.sketchpad.dispatch(command) {
            Outcome::Unchanged => false,
            Outcome::Redraw => true,
            Outcome::Play(request) => {
                match self.audio.submit(request) {
                    Admission::Play(request) => self.start_playback(ctx, request),
                    Admission::Queued => log::debug!("{:?} waits for the audio engine", request),
                    Admission::Initialize => self.initialize_audio(ctx),
                }

                true
            }
            Outcome::Stop => {
                self.audio.stop();
                self.stop_playhead();
                true
            }
        }
    }

    fn initialize_audio(&self, ctx: &Context<Self>) {
        let link = ctx.link().clone();

        spawn_local(async move {
            match MidiSynth::request().await {
                Ok(synth) => link.send_message(Msg::EngineReady(synth)),
                Err(err) => link.send_message(Msg::EngineFailed(err)),
            }
        });
    }

    fn start_playback(&mut self, ctx: &Context<Self>, request: PlayRequest) {
        let engine = match self.audio.engine_mut() {
            Some(engine) => engine,
            None => return,
        };

        let report = match self.sketchpad.play(request, engine) {
            Ok(report) => report,
            Err(err) => {
                log::warn!("cannot play {:?}: {}", request, err);
                return;
            }
        };

        if report.scheduled == 0 {
            return;
        }

        let now = engine.current_time();

        self.playhead = Some(match self.playhead {
            Some(playhead) => Playhead {
                start: playhead.start,
                end: playhead.end.max(report.last_release),
            },
            None => Playhead {
                start: now,
                end: report.last_release,
            },
        });

        if self.tick_interval.is_none() {
            let link = ctx.link().clone();

            self.tick_interval = Some(Interval::new(PLAYHEAD_TICK_MS, move || {
                link.send_message(Msg::TickPlayhead)
            }));
        }
    }

    fn stop_playhead(&mut self) {
        if let Some(interval) = self.tick_interval.take() {
            interval.cancel();
        }

        self.playhead = None;
    }

    fn playhead_x(&mut self) -> Option<f64> {
        let playhead = self.playhead?;
        let now = self.audio.engine_mut()?.current_time();

        let canvas = self.sketchpad.canvas();
        let duration = self.sketchpad.settings().curve.duration;

        Some(time_to_x(now - playhead.start, canvas.width, duration).clamp(0.0, canvas.width))
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    console_error_panic_hook::set_once();

    yew::start_app::<Model>();
}
