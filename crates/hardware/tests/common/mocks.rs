use memhier_core::Root;
use memhier_core::common::EngineError;
use memhier_core::sim::{ExitEvent, SimulationEngine};
use mockall::mock;

mock! {
    pub Engine {}
    impl SimulationEngine for Engine {
        fn instantiate(&mut self, root: &Root) -> Result<(), EngineError>;
        fn simulate(&mut self) -> Result<ExitEvent, EngineError>;
    }
}
