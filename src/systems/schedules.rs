use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, ScheduleLabel};
use crate::components::{CrateCube, GroundPlane, Spin, Viewer};


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SpawnLabel;

pub fn new_spawn_scene_schedule() -> (Schedule, SpawnLabel) {
    let mut schedule = Schedule::default();
    schedule
        .set_executor_kind(ExecutorKind::SingleThreaded)
        .add_systems(Viewer::spawn.run_if(run_once()))
        .add_systems(GroundPlane::spawn.run_if(run_once()))
        .add_systems(CrateCube::spawn.run_if(run_once()));
    (schedule, SpawnLabel)
}


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UpdateLabel;

pub fn new_update_schedule() -> (Schedule, UpdateLabel) {
    let mut schedule = Schedule::default();
    schedule
        .set_executor_kind(ExecutorKind::SingleThreaded)
        .add_systems(Spin::update);
    (schedule, UpdateLabel)
}
