use arena::KinematicArena;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim::{EngineConfig, EpisodeBatch, EpisodeController};

fn bench_step(c: &mut Criterion) {
    let mut env = EpisodeController::new(EngineConfig::find_and_deliver(), KinematicArena::default())
        .expect("preset is valid");
    let rng = fastrand::Rng::with_seed(0);
    let mut seed = 0;
    env.reset(seed).expect("reset");
    c.bench_function("episode_step", |b| {
        b.iter(|| {
            let outcome = env.step(rng.usize(..3)).expect("step");
            if outcome.done {
                seed += 1;
                env.reset(seed).expect("reset");
            }
            black_box(outcome.reward)
        });
    });
}

fn bench_batch(c: &mut Criterion) {
    let envs = (0..64)
        .map(|_| EpisodeController::new(EngineConfig::warehouse(), KinematicArena::default()))
        .collect::<Result<Vec<_>, _>>()
        .expect("preset is valid");
    let mut batch = EpisodeBatch::new(envs, 0);
    batch.reset_all().expect("reset");
    let actions = vec![0; 64];
    c.bench_function("batch_step_64", |b| {
        b.iter(|| black_box(batch.step(&actions).expect("step")));
    });
}

criterion_group!(benches, bench_step, bench_batch);
criterion_main!(benches);
