use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Target architecture; decides pointer size and the largest object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetArch {
    #[default]
    Amd64,
    Arm64,
    I386,
    Arm,
}

impl TargetArch {
    pub const ALL: [TargetArch; 4] = [Self::Amd64, Self::Arm64, Self::I386, Self::Arm];

    pub fn name(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::I386 => "386",
            Self::Arm => "arm",
        }
    }

    #[inline]
    pub fn ptr_size(self) -> u64 {
        match self {
            Self::Amd64 | Self::Arm64 => 8,
            Self::I386 | Self::Arm => 4,
        }
    }

    /// Largest size in bytes of any object, arrays included.
    #[inline]
    pub fn max_size(self) -> u64 {
        match self.ptr_size() {
            8 => i64::MAX as u64,
            _ => i32::MAX as u64,
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetArch {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| TypeError::UnknownArch(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_pointer_width() {
        assert_eq!(TargetArch::Amd64.ptr_size(), 8);
        assert_eq!(TargetArch::Arm.ptr_size(), 4);
        assert_eq!(TargetArch::I386.max_size(), i32::MAX as u64);
        assert_eq!("arm64".parse::<TargetArch>(), Ok(TargetArch::Arm64));
        assert!("mips".parse::<TargetArch>().is_err());
    }
}
