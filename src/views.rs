use yew::{
    events::{Event, InputEvent},
    prelude::*,
};
use web_sys::HtmlInputElement;

use crate::{
    command::Command,
    convert::{CurveShape, ShapeRequest},
    notes::NoteName,
    playback::PlayRequest,
    project::{Instrument, Note, NoteEdit, Track, TrackId},
    settings::TimeSignature,
    util::{options, parse_event},
    Model, Msg,
};

const SOLFEGE: [&str; 7] = ["do", "re", "mi", "fa", "sol", "la", "si"];

fn command(command: Command) -> Option<Msg> {
    Some(Msg::Command(command))
}

impl Model {
    pub fn view_top_bar(&self, ctx: &Context<Self>) -> Html {
        let play_all = ctx
            .link()
            .callback(|_| Msg::Command(Command::Play(PlayRequest::AllTracks)));
        let stop = ctx.link().callback(|_| Msg::Command(Command::StopPlayback));
        let clear_all = ctx.link().callback(|_| Msg::Command(Command::ClearAllTracks));

        html! {
            <div id="top-bar" class="h-box frame dark">
                <div class="h-box frame">
                    <button onclick={ play_all }>{ "Play all" }</button>
                    <button onclick={ stop }>{ "Stop" }</button>
                    <button onclick={ clear_all }>{ "Clear all" }</button>
                </div>
                { self.view_bpm(ctx) }
                { self.view_time_signature(ctx) }
                { self.view_quantize(ctx) }
                { self.view_audio_status(ctx) }
            </div>
        }
    }

    pub fn view_bpm(&self, ctx: &Context<Self>) -> Html {
        let oninput = ctx.link().batch_callback(|event: InputEvent| {
            event
                .target_dyn_into::<HtmlInputElement>()
                .and_then(|input| input.value().parse().ok())
                .and_then(|bpm| command(Command::SetBpm(bpm)))
        });

        html! {
            <div class="v-box frame">
                <span>{ "BPM" }</span>
                <input type="number" value={ self.sketchpad.settings().music.bpm().to_string() }
                       min="1" max="500" size="5" { oninput }/>
            </div>
        }
    }

    pub fn view_time_signature(&self, ctx: &Context<Self>) -> Html {
        let current = self.sketchpad.settings().music.time_signature();

        let on_numerator_change = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|numerator| {
                command(Command::SetTimeSignature(TimeSignature {
                    numerator,
                    ..current
                }))
            })
        });

        let on_denominator_change = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|denominator| {
                command(Command::SetTimeSignature(TimeSignature {
                    denominator,
                    ..current
                }))
            })
        });

        html! {
            <div class="v-box frame">
                <span>{ "Time Signature" }</span>
                <div class="h-box">
                    <select required=true onchange={ on_numerator_change }>
                        { for options(2..=12u32, &current.numerator) }
                    </select>
                    <span>{ "/" }</span>
                    <select required=true onchange={ on_denominator_change }>
                        { for options([2u32, 4, 8, 16], &current.denominator) }
                    </select>
                </div>
            </div>
        }
    }

    pub fn view_quantize(&self, ctx: &Context<Self>) -> Html {
        let onchange = ctx.link().batch_callback(|event: Event| {
            parse_event(event).and_then(|unit| command(Command::SetQuantizeUnit(unit)))
        });

        let current = self.sketchpad.settings().music.quantize_unit();

        html! {
            <div class="v-box frame">
                <span>{ "Quantize (1/n)" }</span>
                <select required=true { onchange }>
                    { for options([1u32, 2, 4, 8, 16], &current) }
                </select>
            </div>
        }
    }

    pub fn view_audio_status(&self, ctx: &Context<Self>) -> Html {
        let status = if self.audio.is_ready() {
            html! { <span>{ "Audio ready" }</span> }
        } else {
            let enable = ctx.link().callback(|_| Msg::EnableAudio);
            html! { <button onclick={ enable }>{ "Enable audio" }</button> }
        };

        html! {
            <div class="v-box frame">
                { status }
            </div>
        }
    }

    pub fn view_canvas(&self, ctx: &Context<Self>) -> Html {
        let canvas = self.sketchpad.canvas();

        let onmousedown = ctx.link().callback(Msg::CanvasMouseDown);
        let onmousemove = ctx.link().callback(Msg::CanvasMouseMove);
        let onmouseup = ctx.link().callback(|_: MouseEvent| Msg::CanvasMouseUp);
        let onmouseleave = ctx.link().callback(|_: MouseEvent| Msg::CanvasMouseUp);

        html! {
            <canvas ref={ self.canvas.clone() } id="sketchpad"
                    width={ canvas.width.to_string() } height={ canvas.height.to_string() }
                    { onmousedown } { onmousemove } { onmouseup } { onmouseleave }/>
        }
    }

    pub fn view_curve_panel(&self, ctx: &Context<Self>) -> Html {
        let project = self.sketchpad.project();
        let current = self.sketchpad.current_track();
        let curve_settings = self.sketchpad.settings().curve;

        let track_options = project.tracks().iter().map(|track| {
            html! {
                <option value={ track.id.to_string() } selected={ track.id == current }>
                    { track.name.to_string() }
                </option>
            }
        });

        let on_select = ctx.link().batch_callback(|event: Event| {
            parse_event(event).and_then(|id| command(Command::SelectTrack(id)))
        });

        let on_instrument = ctx.link().batch_callback(|event: Event| {
            parse_event(event)
                .and_then(|instrument| command(Command::SetCurveInstrument(instrument)))
        });

        let on_duration = ctx.link().batch_callback(|event: Event| {
            parse_event(event).and_then(|duration| command(Command::SetDuration(duration)))
        });
        let on_density = ctx.link().batch_callback(|event: Event| {
            parse_event(event).and_then(|density| command(Command::SetDensity(density)))
        });
        let on_octaves = ctx.link().batch_callback(|event: Event| {
            parse_event(event).and_then(|range| command(Command::SetOctaveRange(range)))
        });

        let button = |label: &str, cmd: Command| {
            let onclick = ctx.link().callback(move |_| Msg::Command(cmd.clone()));
            html! { <button { onclick }>{ label.to_string() }</button> }
        };

        let curves = project
            .track(current)
            .map(|track| self.view_curve_list(ctx, track))
            .unwrap_or_default();

        html! {
            <div id="curve-panel" class="v-box-left frame full-width">
                <div class="h-box full-width">
                    <span>{ "Draw on: " }</span>
                    <select onchange={ on_select }>
                        { for track_options }
                    </select>
                    <select onchange={ on_instrument }>
                        { for options(Instrument::ALL, &self.sketchpad.curve_instrument()) }
                    </select>
                </div>
                <div class="h-box full-width">
                    <span>{ "Duration (s)" }</span>
                    <input type="number" min="0.5" step="0.5" size="4"
                           value={ curve_settings.duration.to_string() } onchange={ on_duration }/>
                    <span>{ "Density" }</span>
                    <input type="number" min="1" max="1000" size="3"
                           value={ curve_settings.density.to_string() } onchange={ on_density }/>
                    <span>{ "Octaves" }</span>
                    <input type="number" min="1" max="6" size="2"
                           value={ curve_settings.octave_range.to_string() }
                           onchange={ on_octaves }/>
                </div>
                <div class="h-box full-width">
                    { button("Play", Command::Play(PlayRequest::CurrentCurves)) }
                    { button("Play all curves", Command::Play(PlayRequest::AllCurves)) }
                    { button("To notes", Command::ConvertCurvesToNotes) }
                </div>
                <div class="h-box full-width">
                    { button("Smooth", Command::SmoothCurves) }
                    { button("Clean up", Command::CleanupCurves) }
                    { button("Clear", Command::ClearCurves) }
                </div>
                { curves }
            </div>
        }
    }

    fn view_curve_list(&self, ctx: &Context<Self>, track: &Track) -> Html {
        let id = track.id;

        let rows = track.curves.iter().enumerate().map(|(index, curve)| {
            let edit = ctx.link().callback(move |_| Msg::Command(Command::EditCurve(id, index)));
            let play = ctx.link().callback(move |_| {
                Msg::Command(Command::Play(PlayRequest::Curve { track: id, index }))
            });
            let delete = ctx
                .link()
                .callback(move |_| Msg::Command(Command::DeleteCurve(id, index)));

            let label = format!(
                "Curve {} ({}, {} points)",
                index + 1,
                curve.instrument.label(),
                curve.points.len()
            );

            html! {
                <li class="h-box">
                    <span>{ label }</span>
                    <button onclick={ edit }>{ "Edit" }</button>
                    <button onclick={ play }>{ "Play" }</button>
                    <button onclick={ delete }>{ "Delete" }</button>
                </li>
            }
        });

        html! {
            <ul class="curve-list">
                { for rows }
            </ul>
        }
    }

    pub fn view_edit_panel(&self, ctx: &Context<Self>) -> Html {
        let session = match self.sketchpad.editing() {
            Some(session) => session,
            None => return html! {},
        };

        let request = session.suggestion;

        let preview = |request: ShapeRequest| command(Command::PreviewShape(request));

        let on_start = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|start| preview(ShapeRequest { start, ..request }))
        });
        let on_end = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|end| preview(ShapeRequest { end, ..request }))
        });
        let on_shape = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|shape| preview(ShapeRequest { shape, ..request }))
        });
        let on_density = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|density| preview(ShapeRequest { density, ..request }))
        });

        let preview = ctx
            .link()
            .callback(move |_| Msg::Command(Command::PreviewShape(request)));
        let apply = ctx
            .link()
            .callback(move |_| Msg::Command(Command::ApplyShape(request)));
        let cancel = ctx.link().callback(|_| Msg::Command(Command::CancelCurveEdit));

        let title = format!(
            "Editing curve {} of track {}",
            session.curve_index + 1,
            session.track_id
        );

        html! {
            <div id="edit-panel" class="v-box-left frame full-width">
                <span>{ title }</span>
                <div class="h-box full-width">
                    <select onchange={ on_start }>
                        { for options(NoteName::all(), &request.start) }
                    </select>
                    <span>{ "to" }</span>
                    <select onchange={ on_end }>
                        { for options(NoteName::all(), &request.end) }
                    </select>
                </div>
                <div class="h-box full-width">
                    <select onchange={ on_shape }>
                        { for options(CurveShape::ALL, &request.shape) }
                    </select>
                    <input type="number" min="2" max="1000" size="3"
                           value={ request.density.to_string() } onchange={ on_density }/>
                </div>
                <div class="h-box full-width">
                    <button onclick={ preview }>{ "Preview" }</button>
                    <button onclick={ apply }>{ "Apply" }</button>
                    <button onclick={ cancel }>{ "Cancel" }</button>
                </div>
            </div>
        }
    }

    pub fn view_palette(&self, ctx: &Context<Self>) -> Html {
        let rows = Instrument::ALL.into_iter().map(|instrument| {
            let keys = SOLFEGE.iter().enumerate().map(|(i, name)| {
                let frequency = NoteName::A4.frequency() * 2f64.powf(i as f64 / 12.0);
                let onclick = ctx.link().callback(move |_| {
                    Msg::Command(Command::Play(PlayRequest::Pitch {
                        instrument,
                        frequency,
                    }))
                });

                html! { <button { onclick }>{ name.to_string() }</button> }
            });

            html! {
                <div class="h-box">
                    <span>{ instrument.label() }</span>
                    { for keys }
                </div>
            }
        });

        html! {
            <div id="palette" class="v-box-left frame">
                { for rows }
            </div>
        }
    }

    pub fn view_tracks(&self, ctx: &Context<Self>) -> Html {
        let add = ctx.link().callback(|_| Msg::Command(Command::AddTrack));
        let tracks = self.sketchpad.project().tracks();

        let panels = tracks
            .iter()
            .enumerate()
            .map(|(index, track)| self.view_track(ctx, track, index > 0));

        html! {
            <div id="tracks" class="v-box-left frame dark">
                { for panels }
                <button onclick={ add }>{ "Add track" }</button>
            </div>
        }
    }

    fn view_track(&self, ctx: &Context<Self>, track: &Track, removable: bool) -> Html {
        let id = track.id;

        let on_instrument = ctx.link().batch_callback(move |event: Event| {
            parse_event(event)
                .and_then(|instrument| command(Command::SetTrackInstrument(id, instrument)))
        });

        let play = ctx
            .link()
            .callback(move |_| Msg::Command(Command::Play(PlayRequest::Track(id))));
        let clear = ctx.link().callback(move |_| Msg::Command(Command::ClearTrack(id)));
        let to_curve = ctx
            .link()
            .callback(move |_| Msg::Command(Command::ConvertNotesToCurve(id)));

        let remove = if removable {
            let onclick = ctx.link().callback(move |_| Msg::Command(Command::RemoveTrack(id)));
            html! { <button { onclick }>{ "Remove" }</button> }
        } else {
            html! {}
        };

        let start = track.notes.last().map_or(0.0, Note::end);
        let beat = self.sketchpad.settings().music.beat_duration();
        let next = NoteName::from_midi(60).and_then(|pitch| Note::new(pitch, start, beat).ok());

        let add_note = ctx.link().batch_callback(move |_| {
            next.clone().and_then(|note| command(Command::AddNote(id, note)))
        });

        let notes = track
            .notes
            .iter()
            .enumerate()
            .map(|(index, note)| self.view_note(ctx, id, index, note));

        html! {
            <div class="v-box-left frame full-width">
                <div class="h-box full-width">
                    <span>{ track.name.to_string() }</span>
                    <select onchange={ on_instrument }>
                        { for options(Instrument::ALL, &track.instrument) }
                    </select>
                    <button onclick={ play }>{ "Play" }</button>
                    <button onclick={ clear }>{ "Clear" }</button>
                    <button onclick={ to_curve }>{ "To curve" }</button>
                    { remove }
                </div>
                <ul class="note-list">
                    { for notes }
                </ul>
                <button onclick={ add_note }>{ "Add note" }</button>
            </div>
        }
    }

    fn view_note(&self, ctx: &Context<Self>, id: TrackId, index: usize, note: &Note) -> Html {
        let edit = move |change: NoteEdit| command(Command::EditNote(id, index, change));

        let on_pitch = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|pitch| edit(NoteEdit::Pitch(pitch)))
        });
        let on_time = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|time| edit(NoteEdit::Time(time)))
        });
        let on_duration = ctx.link().batch_callback(move |event: Event| {
            parse_event(event).and_then(|duration| edit(NoteEdit::Duration(duration)))
        });

        let preview = ctx.link().callback(move |_| {
            Msg::Command(Command::Play(PlayRequest::Note { track: id, index }))
        });
        let delete = ctx
            .link()
            .callback(move |_| Msg::Command(Command::DeleteNote(id, index)));

        let instrument = note
            .instrument
            .map(|instrument| instrument.label())
            .unwrap_or_default();

        html! {
            <li class="h-box">
                <select onchange={ on_pitch }>
                    { for options(NoteName::all(), &note.pitch) }
                </select>
                <input type="number" min="0" step="0.125" size="5"
                       value={ note.time.to_string() } onchange={ on_time }/>
                <input type="number" min="0.0625" step="0.125" size="5"
                       value={ note.duration.to_string() } onchange={ on_duration }/>
                <span>{ instrument }</span>
                <button onclick={ preview }>{ "Preview" }</button>
                <button onclick={ delete }>{ "Delete" }</button>
            </li>
        }
    }
}
