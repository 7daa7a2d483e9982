//! Build modes
//!
//! A firmware image runs exactly one mode for its whole life. The mode is
//! fixed at build time from a handful of boolean flags; `BuildFlags::resolve`
//! is `const` so boards can reject a bad flag combination at compile time:
//!
//! ```
//! use bootstrap_core::{BuildFlags, BuildMode};
//!
//! const MODE: BuildMode = match BuildFlags::NONE.with_ota_update_task().resolve() {
//!     Ok(mode) => mode,
//!     Err(_) => panic!("conflicting boot mode flags"),
//! };
//! assert_eq!(MODE, BuildMode::Operational { ota_update: true });
//! ```

/// Operating mode of one firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuildMode {
    /// Store plus the provisioning command line
    Provisioning,
    /// Normal device operation through the communication agent
    Operational {
        /// Also run the OTA update task
        ota_update: bool,
    },
    /// On-device qualification test suite
    QualificationTest,
    /// Device Advisor subscribe/publish test suite
    DeviceAdvisorTest,
    /// OTA end-to-end test suite. Recognised, but wires no worker.
    OtaEndToEndTest,
}

impl BuildMode {
    /// Whether this mode stands up the communication agent
    pub const fn uses_agent(self) -> bool {
        matches!(self, Self::Operational { .. } | Self::DeviceAdvisorTest)
    }
}

/// Compile-time configuration flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildFlags {
    pub provisioning_mode: bool,
    /// Modifier, only valid in operational mode
    pub include_ota_update_task: bool,
    pub run_qualification_test_suite: bool,
    pub run_device_advisor_test_suite: bool,
    pub run_ota_end_to_end_test_suite: bool,
}

/// Invalid flag combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlagError {
    /// More than one mode flag is set
    ConflictingModes,
    /// OTA update task requested outside operational mode
    OtaUpdateRequiresOperational,
}

impl core::fmt::Display for FlagError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConflictingModes => write!(f, "More than one boot mode selected"),
            Self::OtaUpdateRequiresOperational => {
                write!(f, "OTA update task requires operational mode")
            }
        }
    }
}

impl core::error::Error for FlagError {}

impl BuildFlags {
    /// No flags set: operational mode without OTA
    pub const NONE: BuildFlags = BuildFlags {
        provisioning_mode: false,
        include_ota_update_task: false,
        run_qualification_test_suite: false,
        run_device_advisor_test_suite: false,
        run_ota_end_to_end_test_suite: false,
    };

    pub const fn with_provisioning_mode(mut self) -> Self {
        self.provisioning_mode = true;
        self
    }

    pub const fn with_ota_update_task(mut self) -> Self {
        self.include_ota_update_task = true;
        self
    }

    pub const fn with_qualification_test_suite(mut self) -> Self {
        self.run_qualification_test_suite = true;
        self
    }

    pub const fn with_device_advisor_test_suite(mut self) -> Self {
        self.run_device_advisor_test_suite = true;
        self
    }

    pub const fn with_ota_end_to_end_test_suite(mut self) -> Self {
        self.run_ota_end_to_end_test_suite = true;
        self
    }

    /// Resolve the flags to exactly one mode
    pub const fn resolve(self) -> Result<BuildMode, FlagError> {
        let selected = self.provisioning_mode as u8
            + self.run_qualification_test_suite as u8
            + self.run_device_advisor_test_suite as u8
            + self.run_ota_end_to_end_test_suite as u8;

        if selected > 1 {
            return Err(FlagError::ConflictingModes);
        }
        if selected == 1 && self.include_ota_update_task {
            return Err(FlagError::OtaUpdateRequiresOperational);
        }

        let mode = if self.provisioning_mode {
            BuildMode::Provisioning
        } else if self.run_qualification_test_suite {
            BuildMode::QualificationTest
        } else if self.run_device_advisor_test_suite {
            BuildMode::DeviceAdvisorTest
        } else if self.run_ota_end_to_end_test_suite {
            BuildMode::OtaEndToEndTest
        } else {
            BuildMode::Operational {
                ota_update: self.include_ota_update_task,
            }
        };
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_operational() {
        assert_eq!(
            BuildFlags::NONE.resolve(),
            Ok(BuildMode::Operational { ota_update: false })
        );
        assert_eq!(BuildFlags::default(), BuildFlags::NONE);
    }

    #[test]
    fn test_single_mode_flags() {
        assert_eq!(
            BuildFlags::NONE.with_provisioning_mode().resolve(),
            Ok(BuildMode::Provisioning)
        );
        assert_eq!(
            BuildFlags::NONE.with_qualification_test_suite().resolve(),
            Ok(BuildMode::QualificationTest)
        );
        assert_eq!(
            BuildFlags::NONE.with_device_advisor_test_suite().resolve(),
            Ok(BuildMode::DeviceAdvisorTest)
        );
        assert_eq!(
            BuildFlags::NONE.with_ota_end_to_end_test_suite().resolve(),
            Ok(BuildMode::OtaEndToEndTest)
        );
    }

    #[test]
    fn test_ota_modifier() {
        assert_eq!(
            BuildFlags::NONE.with_ota_update_task().resolve(),
            Ok(BuildMode::Operational { ota_update: true })
        );
        assert_eq!(
            BuildFlags::NONE
                .with_provisioning_mode()
                .with_ota_update_task()
                .resolve(),
            Err(FlagError::OtaUpdateRequiresOperational)
        );
    }

    #[test]
    fn test_conflicting_modes() {
        // Both test suites enabled at once is rejected rather than run back to back
        let flags = BuildFlags::NONE
            .with_qualification_test_suite()
            .with_device_advisor_test_suite();
        assert_eq!(flags.resolve(), Err(FlagError::ConflictingModes));
    }

    #[test]
    fn test_uses_agent() {
        assert!(BuildMode::Operational { ota_update: false }.uses_agent());
        assert!(BuildMode::DeviceAdvisorTest.uses_agent());
        assert!(!BuildMode::Provisioning.uses_agent());
        assert!(!BuildMode::QualificationTest.uses_agent());
        assert!(!BuildMode::OtaEndToEndTest.uses_agent());
    }
}
