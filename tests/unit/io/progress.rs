//! Tests for progress display lifecycle

#[cfg(test)]
mod tests {
    use treegen::io::progress::ProgressManager;

    // Progress display must survive a full job lifecycle without a
    // terminal attached
    #[test]
    fn test_lifecycle_without_terminal() {
        let mut pm = ProgressManager::new();
        pm.initialize(3);
        pm.start_job("heptagonal", 999);
        pm.update_attempt(1, 120, 4);
        pm.update_attempt(2, 240, 6);
        pm.complete_job("rules generated successfully: 6 states");
        pm.finish();
    }

    #[test]
    fn test_single_job_has_no_batch_bar() {
        let mut pm = ProgressManager::default();
        pm.initialize(1);
        pm.start_job("pentagonal", 10);
        pm.complete_job("done");
        pm.finish();
    }
}
