//! Android ABI table
//!
//! Maps each supported Android ABI to its NDK target triplet, NDK
//! architecture name, and the architecture-specific compile flags.

/// Target ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abi {
    ArmeabiV7a,
    Arm64V8a,
    X86,
    X86_64,
}

impl Abi {
    /// ABI name as used by the NDK and in APK lib directories
    pub fn name(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "armeabi-v7a",
            Abi::Arm64V8a => "arm64-v8a",
            Abi::X86 => "x86",
            Abi::X86_64 => "x86_64",
        }
    }

    /// NDK target triplet for this ABI
    pub fn ndk_triplet(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "armv7a-linux-androideabi",
            Abi::Arm64V8a => "aarch64-linux-android",
            Abi::X86 => "i686-linux-android",
            Abi::X86_64 => "x86_64-linux-android",
        }
    }

    /// Architecture name as the NDK spells it
    pub fn ndk_arch(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "arm",
            Abi::Arm64V8a => "arm64",
            Abi::X86 => "x86",
            Abi::X86_64 => "x86_64",
        }
    }

    /// Architecture-specific compile flags
    pub fn cflags(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "-fpic -mfpu=neon -mfloat-abi=softfp",
            Abi::Arm64V8a => "-fpic",
            Abi::X86 => "-fPIC -march=i686 -mtune=intel -mssse3 -mfpmath=sse -m32",
            Abi::X86_64 => "-fPIC -m64",
        }
    }

    /// Parse from an ABI name or NDK triplet
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "armeabi-v7a" | "armv7a-linux-androideabi" => Some(Abi::ArmeabiV7a),
            "arm64-v8a" | "aarch64-linux-android" => Some(Abi::Arm64V8a),
            "x86" | "i686-linux-android" => Some(Abi::X86),
            "x86_64" | "x86_64-linux-android" => Some(Abi::X86_64),
            _ => None,
        }
    }

    /// All supported ABIs
    pub fn all() -> &'static [Abi] {
        &[Abi::ArmeabiV7a, Abi::Arm64V8a, Abi::X86, Abi::X86_64]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_triplets() {
        assert_eq!(Abi::Arm64V8a.ndk_triplet(), "aarch64-linux-android");
        assert_eq!(Abi::ArmeabiV7a.ndk_triplet(), "armv7a-linux-androideabi");
        assert_eq!(Abi::ArmeabiV7a.name(), "armeabi-v7a");
        assert_eq!(Abi::X86.ndk_arch(), "x86");
    }

    #[test]
    fn test_abi_from_name() {
        assert_eq!(Abi::from_name("arm64-v8a"), Some(Abi::Arm64V8a));
        assert_eq!(Abi::from_name("x86_64-linux-android"), Some(Abi::X86_64));
        assert_eq!(Abi::from_name("unknown"), None);
    }

    #[test]
    fn test_abi_cflags() {
        assert!(Abi::ArmeabiV7a.cflags().contains("-mfpu=neon"));
        assert!(Abi::X86_64.cflags().contains("-m64"));
    }
}
