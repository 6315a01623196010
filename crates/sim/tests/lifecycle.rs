mod common;

use anyhow::Result;
use common::{drift, four_items, Recorder, ScriptedPhysics};
use glam::Vec2;
use sim::{
    CollaboratorError, CosmeticEvent, EngineConfig, EngineError, Env, EpisodeController,
    EpisodeState, Tag,
};

#[test]
fn invalid_action_changes_nothing() -> Result<()> {
    let mut env = EpisodeController::new(EngineConfig::warehouse(), ScriptedPhysics::open())?;
    env.reset(3)?;
    env.step(0)?;
    let agent = env.world().agent().clone();
    let episode = *env.episode();

    let err = env.step(env.action_count()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction { index: 3, available: 3 }));
    assert_eq!(env.world().agent(), &agent);
    assert_eq!(env.episode(), &episode);
    assert_eq!(env.state(), EpisodeState::Active);
    assert_eq!(env.physics().ticks, 1);

    env.step(0)?;
    assert_eq!(env.episode().current_step, 2);
    Ok(())
}

#[test]
fn terminal_side_effect_advances_physics_once() -> Result<()> {
    const DROP: usize = 5;
    let physics = ScriptedPhysics::touch_after(0, Tag::Wall);
    let mut env = EpisodeController::new(EngineConfig::manipulate(), physics)?;
    env.reset(3)?;

    let outcome = env.step(DROP)?;
    assert_eq!(outcome.cause, Some(sim::TerminationCause::DeliveredIncorrect));
    assert_eq!(outcome.events, vec![sim::WorldEvent::DeliveredIncorrect]);
    assert_eq!(env.physics().ticks, 1);
    Ok(())
}

#[test]
fn collaborator_fault_aborts_until_reset() -> Result<()> {
    let physics = ScriptedPhysics::open().failing_on_tick(2);
    let mut env = EpisodeController::new(EngineConfig::warehouse(), physics)?;
    env.reset(3)?;
    env.step(0)?;
    env.step(0)?;

    let err = env.step(0).unwrap_err();
    assert!(matches!(err, EngineError::EngineFault(CollaboratorError::CollisionService(_))));
    assert_eq!(env.state(), EpisodeState::Aborted);
    assert!(matches!(env.step(0), Err(EngineError::InvalidState { state: EpisodeState::Aborted })));

    env.reset(4)?;
    assert_eq!(env.state(), EpisodeState::Active);
    assert_eq!(env.episode().current_step, 0);
    env.step(0)?;
    Ok(())
}

#[test]
fn malformed_ray_aborts() -> Result<()> {
    let physics = ScriptedPhysics::open().with_hit(f32::INFINITY, Tag::Wall);
    let mut env = EpisodeController::new(EngineConfig::warehouse(), physics)?;
    let err = env.reset(0).unwrap_err();
    assert!(matches!(err, EngineError::EngineFault(CollaboratorError::Malformed(_))));
    assert_eq!(env.state(), EpisodeState::Aborted);
    Ok(())
}

#[test]
fn episodes_never_exceed_max_steps() -> Result<()> {
    let config = EngineConfig::find_and_deliver().with_items(four_items()).with_max_steps(40);
    let mut env = EpisodeController::new(config, ScriptedPhysics::open())?;
    let rng = fastrand::Rng::with_seed(7);
    for seed in 0..10 {
        env.reset(seed)?;
        let mut steps = 0;
        loop {
            let outcome = env.step(rng.usize(..env.action_size()))?;
            steps += 1;
            if outcome.done {
                break;
            }
        }
        assert!(steps <= 40);
        assert_eq!(env.episode().current_step, steps);
    }
    Ok(())
}

#[test]
fn observation_shape_is_fixed() -> Result<()> {
    for config in [
        EngineConfig::warehouse(),
        EngineConfig::find_items(),
        EngineConfig::find_and_deliver().with_items(four_items()),
        EngineConfig::manipulate(),
    ] {
        let physics = ScriptedPhysics::touch_after(1, Tag::Item(sim::ItemId(0))).with_hit(1.0, Tag::Wall);
        let mut env = EpisodeController::new(config.with_max_steps(6), physics)?;
        let expected = env.obs_size();
        for seed in 0..4 {
            assert_eq!(env.reset(seed)?.len(), expected);
            loop {
                let outcome = env.step(1)?;
                assert_eq!(outcome.observation.len(), expected);
                assert_eq!(outcome.observation.as_bytes().len(), expected * 4);
                if outcome.done {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[test]
fn same_seed_same_trajectory() -> Result<()> {
    let run = || -> Result<Vec<Vec<f32>>> {
        let mut env = EpisodeController::new(EngineConfig::manipulate(), ScriptedPhysics::open())?;
        let mut observations = vec![env.reset(99)?.into_vec()];
        for action in [1, 1, 2, 1, 3, 1, 0, 1] {
            observations.push(env.step(action)?.observation.into_vec());
        }
        Ok(observations)
    };
    assert_eq!(run()?, run()?);
    Ok(())
}

#[test]
fn body_drift_is_discarded() -> Result<()> {
    let mut physics = ScriptedPhysics::open();
    physics.drift = Some(drift());
    let mut env = EpisodeController::new(EngineConfig::manipulate(), physics)?;
    env.reset(5)?;
    let heading = env.world().agent().pose.heading;
    for _ in 0..10 {
        env.step(1)?;
    }
    let pose = env.world().agent().pose;
    assert_eq!(pose.heading, heading);
    let expected = 10.0 * 3.0 * 0.02;
    assert!((pose.position.distance(Vec2::ZERO) - expected).abs() < 1e-4);
    Ok(())
}

#[test]
fn renderer_sees_demand_and_held_changes() -> Result<()> {
    let mut config = EngineConfig::warehouse();
    config.task.preheld_probability = 0.0;
    let demanded = common::demanded_for(&config, 8);
    let recorder = Recorder::default();
    let events = recorder.0.clone();
    let mut env = EpisodeController::new(config, ScriptedPhysics::touch_after(0, Tag::Item(demanded)))?
        .with_renderer(Box::new(recorder));

    env.reset(8)?;
    env.step(0)?;

    let events = events.lock().map(|events| events.clone()).unwrap_or_default();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], CosmeticEvent::DemandChanged { item, .. } if *item == demanded));
    assert!(matches!(&events[1], CosmeticEvent::HeldChanged { item: None, .. }));
    let expected = CosmeticEvent::HeldChanged {
        item: Some(demanded),
        visual: Some(env.world().items()[demanded.index()].visual.clone()),
    };
    assert_eq!(events[2], expected);
    Ok(())
}

#[test]
fn collaborator_is_told_about_every_episode() -> Result<()> {
    let mut env = EpisodeController::new(EngineConfig::warehouse(), ScriptedPhysics::open())?;
    for seed in 0..3 {
        env.reset(seed)?;
    }
    assert_eq!(env.physics().episodes, 3);
    Ok(())
}

#[test]
fn batch_survives_a_faulting_member() -> Result<()> {
    let envs = vec![
        EpisodeController::new(EngineConfig::warehouse(), ScriptedPhysics::open())?,
        EpisodeController::new(EngineConfig::warehouse(), ScriptedPhysics::open().failing_on_tick(0))?,
    ];
    let mut batch = sim::EpisodeBatch::new(envs, 0);
    batch.reset_all()?;

    let first = batch.step(&[0, 0])?;
    assert!(first.faults[0].is_none());
    assert!(matches!(first.faults[1], Some(EngineError::EngineFault(CollaboratorError::CollisionService(_)))));
    assert_eq!(batch.envs()[0].episode().current_step, 1);
    assert_eq!(batch.envs()[1].state(), EpisodeState::Active);
    assert_eq!(batch.envs()[1].episode().seed, sim::SEED_STRIDE + 1);

    let second = batch.step(&[0, 0])?;
    assert!(second.faults.iter().all(Option::is_none));
    assert_eq!(batch.envs()[0].episode().current_step, 2);
    assert_eq!(batch.envs()[1].episode().current_step, 1);
    Ok(())
}
