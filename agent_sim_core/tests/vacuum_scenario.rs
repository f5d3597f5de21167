use agent_sim_core::{
    agent::Entity,
    environment::Environment,
    error::RegistryError,
    vacuum::{
        LOC_A, LOC_B, LOC_C, Status, VacuumEnvironment, load_statuses_from_string,
        table_driven_vacuum_agent,
    },
};
use rand::{SeedableRng, rngs::StdRng};

fn scenario_world() -> VacuumEnvironment {
    // A Dirty, B Clean / D Clean, C Dirty
    let statuses = load_statuses_from_string("D C\nC D").unwrap();
    VacuumEnvironment::with_statuses(statuses, StdRng::seed_from_u64(0)).unwrap()
}

#[test]
fn table_driven_agent_follows_the_cycle() {
    let mut env = scenario_world();
    let id = env.reserve_entity_id();
    env.add(table_driven_vacuum_agent(id), Some(LOC_A)).unwrap();

    let expected = [
        (LOC_A, 10, Status::Clean),
        (LOC_B, 9, Status::Clean),
        (LOC_C, 8, Status::Dirty),
        (LOC_C, 18, Status::Clean),
    ];
    for (location, performance, status_here) in expected {
        assert_eq!(env.run(1).unwrap(), 1);
        let agent = env.registry().get(id).unwrap();
        assert_eq!(agent.location(), Some(&location));
        assert_eq!(agent.performance(), Some(performance));
        assert_eq!(env.status(location), Some(status_here));
    }
    assert_eq!(env.status(LOC_A), Some(Status::Clean));
    assert!(env.all_clean());
}

#[test]
fn run_with_zero_budget_is_a_no_op() {
    let mut env = scenario_world();
    let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
    let before = env.statuses().clone();

    assert_eq!(env.run(0).unwrap(), 0);
    assert_eq!(env.statuses(), &before);
    let agent = env.registry().get(id).unwrap();
    assert_eq!(agent.location(), Some(&LOC_A));
    assert_eq!(agent.performance(), Some(0));
}

#[test]
fn dead_agent_ends_the_run() {
    let mut env = scenario_world();
    let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
    env.run(1).unwrap();
    env.registry_mut().get_mut(id).unwrap().kill();

    assert!(env.is_done());
    assert_eq!(env.run(100).unwrap(), 0);
    assert_eq!(env.registry().get(id).unwrap().performance(), Some(10));
    assert!(env.is_done());
}

#[test]
fn registry_anomalies_do_not_abort_the_simulation() {
    let mut env = scenario_world();
    let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
    let dirt = env.add(Entity::thing(1), Some(LOC_B)).unwrap();

    assert_eq!(
        env.add(table_driven_vacuum_agent(id), Some(LOC_C)),
        Err(RegistryError::DuplicateEntity { id })
    );
    assert!(matches!(
        env.remove(42),
        Err(RegistryError::MissingEntity { id: 42, .. })
    ));

    assert_eq!(env.run(2).unwrap(), 2);
    assert_eq!(env.registry().get(id).unwrap().performance(), Some(9));
    assert_eq!(env.registry().get(dirt).unwrap().location(), Some(&LOC_B));
    assert_eq!(env.registry().things().len(), 2);
    assert_eq!(env.registry().agent_ids(), &[id]);
}
