//! End-to-end scenarios for the lightbox and typewriter.
//!
//! Every test drives the components through the virtual scheduler, so the
//! timings asserted here are exact.

use std::{cell::RefCell, rc::Rc};

use kilowhat_core::{
    GestureLightbox, ImageSource, LightboxOptions, LightboxState, Platform, TouchPoint, Typewriter,
    TypewriterOptions,
    lightbox::CLOSE_ANNOUNCEMENT,
    platform::Environment,
    testing::{
        RecordingAnnouncer, RecordingSurface, RecordingView, ScriptedDecoder, StaticEnvironment,
        VirtualScheduler,
    },
};

struct LightboxFixture {
    scheduler: Rc<VirtualScheduler>,
    decoder: Rc<ScriptedDecoder>,
    announcer: Rc<RecordingAnnouncer>,
    view: Rc<RecordingView>,
    lightbox: GestureLightbox<Rc<RecordingView>>,
    states: Rc<RefCell<Vec<LightboxState>>>,
}

fn lightbox_fixture(env: StaticEnvironment) -> LightboxFixture {
    let scheduler = VirtualScheduler::new();
    let decoder = Rc::new(ScriptedDecoder::new(scheduler.clone()));
    let announcer = Rc::new(RecordingAnnouncer::default());
    let view = Rc::new(RecordingView::default());
    let platform = Platform::new(scheduler.clone(), Rc::new(env), announcer.clone());
    let lightbox =
        GestureLightbox::new(view.clone(), decoder.clone(), platform, LightboxOptions::default())
            .expect("default options are valid");

    let states = Rc::new(RefCell::new(vec![lightbox.state()]));
    let sink = states.clone();
    lightbox.set_state_observer(move |state| sink.borrow_mut().push(state));

    LightboxFixture {
        scheduler,
        decoder,
        announcer,
        view,
        lightbox,
        states,
    }
}

struct TypewriterFixture {
    scheduler: Rc<VirtualScheduler>,
    surface: Rc<RecordingSurface>,
    typewriter: Typewriter<Rc<RecordingSurface>>,
}

fn typewriter_fixture(options: TypewriterOptions, env: StaticEnvironment) -> TypewriterFixture {
    let scheduler = VirtualScheduler::new();
    let surface = Rc::new(RecordingSurface::default());
    let platform = Platform::new(
        scheduler.clone(),
        Rc::new(env),
        Rc::new(RecordingAnnouncer::default()),
    );
    let typewriter =
        Typewriter::new(surface.clone(), platform, options).expect("options are valid");
    TypewriterFixture {
        scheduler,
        surface,
        typewriter,
    }
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_open_with_slow_decode() {
    let f = lightbox_fixture(StaticEnvironment::default());
    f.decoder.succeed("/images/full/harbour.jpg", 50);

    f.lightbox
        .open(&ImageSource::new("/images/full/harbour.jpg").with_alt("Harbour at dusk"));
    f.scheduler.advance(49);
    assert_eq!(f.lightbox.state(), LightboxState::Loading);

    f.scheduler.advance(1);
    assert_eq!(
        *f.states.borrow(),
        vec![LightboxState::Closed, LightboxState::Loading, LightboxState::Open]
    );
    assert_eq!(f.view.image_src().as_deref(), Some("/images/full/harbour.jpg"));
    assert!(f.view.focus_trapped());
}

#[test]
fn test_decode_failure_never_sets_source() {
    let f = lightbox_fixture(StaticEnvironment::default());
    f.decoder.fail("/images/full/missing.jpg", 30);

    f.lightbox.open(&ImageSource::new("/images/full/missing.jpg"));
    f.scheduler.advance(100);

    assert_eq!(
        *f.states.borrow(),
        vec![LightboxState::Closed, LightboxState::Loading, LightboxState::Closed]
    );
    assert!(!f.view.ever_set_image());
    assert!(f.announcer.messages().is_empty());
}

#[test]
fn test_swipe_release_rule() {
    let viewport = 800.0;
    let threshold = LightboxOptions::default().swipe_threshold * viewport;

    for (distance, duration, expect_close) in [
        (threshold + 1.0, 2000.0, true),
        (threshold - 1.0, 2000.0, false),
        (30.0, 20.0, true),
        (30.0, 200.0, false),
        (-(threshold + 5.0), 2000.0, true),
    ] {
        let f = lightbox_fixture(StaticEnvironment::default().with_viewport_height(viewport));
        f.decoder.succeed("/a.jpg", 0);
        f.lightbox.open(&ImageSource::new("/a.jpg"));
        f.scheduler.advance(0);

        f.lightbox.touch_start(&[TouchPoint::new(50.0, 400.0)], 0.0);
        f.lightbox
            .touch_move(&[TouchPoint::new(50.0, 400.0 + distance)], duration);
        f.lightbox.touch_end();

        if expect_close {
            assert_eq!(f.lightbox.state(), LightboxState::Closing, "distance {distance}");
        } else {
            assert!(f.lightbox.is_open(), "distance {distance}");
            assert_eq!(f.lightbox.scale(), 1.0);
            assert_eq!(f.view.opacity(), Some(1.0));
        }
    }
}

#[test]
fn test_swipe_dismisses_after_pinch() {
    let f = lightbox_fixture(StaticEnvironment::default());
    f.decoder.succeed("/a.jpg", 0);
    f.lightbox.open(&ImageSource::new("/a.jpg"));
    f.scheduler.advance(0);

    let anchor = TouchPoint::new(0.0, 0.0);
    f.lightbox.touch_start(&[anchor, TouchPoint::new(100.0, 0.0)], 0.0);
    f.lightbox.touch_move(&[anchor, TouchPoint::new(200.0, 0.0)], 10.0);
    f.lightbox.touch_end();
    assert_eq!(f.lightbox.scale(), 2.0);

    f.lightbox.touch_start(&[TouchPoint::new(0.0, 0.0)], 100.0);
    f.lightbox.touch_move(&[TouchPoint::new(0.0, 700.0)], 110.0);
    f.lightbox.touch_end();
    assert_eq!(f.lightbox.state(), LightboxState::Closing);
}

#[test]
fn test_pinch_scale_stays_in_bounds() {
    let options = LightboxOptions::default();
    let env = StaticEnvironment::default().with_seed(99);
    let f = lightbox_fixture(StaticEnvironment::default());
    f.decoder.succeed("/a.jpg", 0);
    f.lightbox.open(&ImageSource::new("/a.jpg"));
    f.scheduler.advance(0);

    for step in 0..200 {
        let start = 1.0 + env.random() * 300.0;
        let end = env.random() * 2000.0;
        let anchor = TouchPoint::new(0.0, 0.0);
        f.lightbox.touch_start(&[anchor, TouchPoint::new(start, 0.0)], step as f64);
        f.lightbox.touch_move(&[anchor, TouchPoint::new(end, 0.0)], step as f64 + 0.5);
        f.lightbox.touch_end();

        let scale = f.lightbox.scale();
        assert!(
            (options.min_zoom..=options.max_zoom).contains(&scale),
            "scale {scale} out of bounds"
        );
    }
}

#[test]
fn test_lightbox_destroy_blocks_stale_callbacks() {
    let f = lightbox_fixture(StaticEnvironment::default());
    f.decoder.succeed("/a.jpg", 0);
    f.lightbox.open(&ImageSource::new("/a.jpg"));
    f.scheduler.advance(0);

    f.lightbox.touch_start(&[TouchPoint::new(0.0, 0.0)], 0.0);
    f.lightbox.touch_move(&[TouchPoint::new(0.0, 40.0)], 1000.0);
    f.lightbox.handle_key("Escape");
    f.lightbox.destroy();

    let calls = f.view.calls().len();
    f.scheduler.advance(10_000);
    f.scheduler.run_frames();
    f.lightbox.close();
    f.lightbox.destroy();

    assert_eq!(f.view.calls().len(), calls);
    assert_eq!(
        f.announcer
            .messages()
            .iter()
            .filter(|m| m.as_str() == CLOSE_ANNOUNCEMENT)
            .count(),
        1
    );
}

#[test]
fn test_typewriter_cycles_two_phrases() {
    let options = TypewriterOptions {
        phrases: phrases(&["ab", "cd"]),
        type_speed: 10,
        erase_speed: 10,
        display_duration: 0,
        pause_duration: 0,
        initial_delay: 0,
        ..TypewriterOptions::default()
    };
    let f = typewriter_fixture(options, StaticEnvironment::default());
    let order = f.typewriter.phrases();

    let completed = Rc::new(RefCell::new(Vec::new()));
    let sink = completed.clone();
    f.typewriter
        .on_phrase_complete(move |_, index| sink.borrow_mut().push(index));
    let cycles = Rc::new(RefCell::new(0));
    let counter = cycles.clone();
    f.typewriter.on_cycle_complete(move || *counter.borrow_mut() += 1);

    f.typewriter.start();
    f.scheduler.advance(39);
    assert_eq!(f.typewriter.state().current_index, 0);
    assert_eq!(f.surface.text(), "");

    f.scheduler.advance(1);
    assert_eq!(f.typewriter.state().current_index, 1);

    f.scheduler.advance(40);
    assert_eq!(f.typewriter.state().current_index, 0);
    assert_eq!(*cycles.borrow(), 1);
    assert_eq!(*completed.borrow(), vec![0, 1]);

    let first = |i: usize| order[i].chars().take(1).collect::<String>();
    let expected = vec![
        first(0),
        order[0].clone(),
        first(0),
        String::new(),
        first(1),
        order[1].clone(),
        first(1),
        String::new(),
        first(0),
    ];
    assert_eq!(f.surface.renders(), expected);
}

#[test]
fn test_typewriter_pause_and_resume() {
    let options = TypewriterOptions {
        phrases: phrases(&["hello"]),
        type_speed: 10,
        initial_delay: 50,
        ..TypewriterOptions::default()
    };
    let f = typewriter_fixture(options, StaticEnvironment::default());

    f.typewriter.start();
    f.scheduler.advance(60);
    assert_eq!(f.surface.text(), "he");

    f.typewriter.pause();
    f.scheduler.advance(5000);
    assert_eq!(f.surface.text(), "he");

    f.typewriter.resume();
    f.scheduler.advance(50);
    assert_eq!(f.surface.text(), "h");
    f.scheduler.advance(10);
    assert_eq!(f.surface.text(), "he");
}

#[test]
fn test_typewriter_reduced_motion_is_instant() {
    let options = TypewriterOptions {
        phrases: phrases(&["reduced", "motion"]),
        display_duration: 3000,
        ..TypewriterOptions::default()
    };
    let env = StaticEnvironment::default().with_reduced_motion(true);
    let f = typewriter_fixture(options, env);

    let completed = Rc::new(RefCell::new(Vec::new()));
    let sink = completed.clone();
    f.typewriter
        .on_phrase_complete(move |phrase, _| sink.borrow_mut().push(phrase.to_string()));

    f.typewriter.start();
    assert_eq!(f.surface.text(), "");
    assert_eq!(f.surface.renders().len(), 2);

    for _ in 0..3 {
        assert!(f.scheduler.run_next());
    }
    assert_eq!(f.scheduler.now(), 0);
    assert_eq!(completed.borrow().len(), 4);
    assert_eq!(f.surface.renders().len(), 8);
    for pair in f.surface.renders().chunks(2) {
        assert!(!pair[0].is_empty());
        assert_eq!(pair[1], "");
    }

    f.typewriter.destroy();
    assert!(!f.scheduler.run_next());
}

#[test]
fn test_typewriter_destroy_is_final() {
    let options = TypewriterOptions {
        phrases: phrases(&["one", "two"]),
        type_speed: 5,
        ..TypewriterOptions::default()
    };
    let f = typewriter_fixture(options, StaticEnvironment::default());
    f.typewriter.start();
    f.scheduler.advance(120);

    f.typewriter.destroy();
    let renders = f.surface.renders().len();
    f.typewriter.destroy();
    f.typewriter.resume();
    f.typewriter.start();
    f.scheduler.advance(60_000);

    assert_eq!(f.surface.renders().len(), renders);
    assert_eq!(f.surface.text(), "");
    assert!(f.typewriter.is_destroyed());
}

#[test]
fn test_instances_are_independent() {
    let options = TypewriterOptions {
        phrases: phrases(&["abc"]),
        type_speed: 10,
        initial_delay: 0,
        ..TypewriterOptions::default()
    };
    let scheduler = VirtualScheduler::new();
    let make = || {
        let surface = Rc::new(RecordingSurface::default());
        let platform = Platform::new(
            scheduler.clone(),
            Rc::new(StaticEnvironment::default()),
            Rc::new(RecordingAnnouncer::default()),
        );
        let typewriter = Typewriter::new(surface.clone(), platform, options.clone()).unwrap();
        (surface, typewriter)
    };
    let (left_surface, left) = make();
    let (right_surface, right) = make();

    left.start();
    right.start();
    scheduler.advance(10);
    left.destroy();
    scheduler.advance(10);

    assert_eq!(left_surface.text(), "");
    assert_eq!(right_surface.text(), "abc");
}
