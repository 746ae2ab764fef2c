/// Identificacion de un caso de uso de sincronizacion
pub trait UseCaseMetadata {
    /// e.g. "u501"
    fn usecase_index() -> &'static str;

    /// e.g. "sync_closures"
    fn usecase_name() -> &'static str;

    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// "u501_sync_closures"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
