//! Declared third-party dependencies
//!
//! The fixed set of codec, network, and compression libraries that make up
//! the target sysroot, in build order: later configure steps probe for
//! earlier installs through the sysroot's pkg-config and search paths.
//!
//! Digests are the values published with each upstream release; their
//! length selects the hash algorithm.

use crossforge_build_engine::{
    AutotoolsConfig, BuildKind, CMakeConfig, MakeConfig, MesonConfig, Recipe,
};

/// All recipes in build order
pub fn all() -> Vec<Recipe> {
    vec![
        zlib(),
        libbz2(),
        libogg(),
        libvorbis(),
        opus(),
        flac(),
        lame(),
        libid3tag(),
        libexpat(),
        libcurl(),
        libmpdclient(),
    ]
}

fn zlib() -> Recipe {
    Recipe::new(
        [
            "https://zlib.net/zlib-1.3.1.tar.xz",
            "https://github.com/madler/zlib/releases/download/v1.3.1/zlib-1.3.1.tar.xz",
        ],
        "38ef96b8dfe510d42707d9c781877914792541133e1870841463bfa73f883e32",
        "lib/libz.a",
        BuildKind::CMake(CMakeConfig::new().define("ZLIB_BUILD_EXAMPLES", "OFF")),
    )
}

fn libbz2() -> Recipe {
    Recipe::new(
        ["https://sourceware.org/pub/bzip2/bzip2-1.0.8.tar.gz"],
        "ab5a03176ee106d3f0fa90e381da478ddae405918153cca248e682cd0c4a2269",
        "lib/libbz2.a",
        // no configure step; the stock Makefile's default target would run
        // the (cross-compiled) test binaries, so name the real targets
        BuildKind::Make(MakeConfig::new().args(["libbz2.a", "bzip2", "bzip2recover"])),
    )
}

fn libogg() -> Recipe {
    Recipe::new(
        [
            "https://downloads.xiph.org/releases/ogg/libogg-1.3.5.tar.xz",
            "https://ftp.osuosl.org/pub/xiph/releases/ogg/libogg-1.3.5.tar.xz",
        ],
        "c4d91be36fc8e54deae7575241e03f4211eb102afb3fc0775fbbc1b740016705",
        "lib/libogg.a",
        BuildKind::Autotools(AutotoolsConfig::new().args(["--disable-shared", "--enable-static"])),
    )
}

fn libvorbis() -> Recipe {
    Recipe::new(
        [
            "https://downloads.xiph.org/releases/vorbis/libvorbis-1.3.7.tar.xz",
            "https://ftp.osuosl.org/pub/xiph/releases/vorbis/libvorbis-1.3.7.tar.xz",
        ],
        "b33cc4934322bcbf6efcbacf49e3ca01aadbea4114ec9589d1b1e9d20f72954b",
        "lib/libvorbis.a",
        BuildKind::Autotools(AutotoolsConfig::new().args([
            "--disable-shared",
            "--enable-static",
            "--disable-oggtest",
        ])),
    )
}

fn opus() -> Recipe {
    Recipe::new(
        [
            "https://downloads.xiph.org/releases/opus/opus-1.4.tar.gz",
            "https://ftp.osuosl.org/pub/xiph/releases/opus/opus-1.4.tar.gz",
        ],
        "c9b32b4253be5ae63d1ff16eea06b94b5f0f2951b7a02aceef58e3a3ce49c51f",
        "lib/libopus.a",
        BuildKind::Autotools(AutotoolsConfig::new().args([
            "--disable-shared",
            "--enable-static",
            "--disable-doc",
            "--disable-extra-programs",
        ])),
    )
}

fn flac() -> Recipe {
    Recipe::new(
        ["https://downloads.xiph.org/releases/flac/flac-1.4.3.tar.xz"],
        "6c58e69cd22348f441b861092b825e591d0b822e106de6eb0ee4d05d27205b70",
        "lib/libFLAC.a",
        BuildKind::Autotools(AutotoolsConfig::new().args([
            "--disable-shared",
            "--enable-static",
            "--disable-xmms-plugin",
            "--disable-cpplibs",
            "--disable-doxygen-docs",
            "--disable-programs",
            "--disable-examples",
        ])),
    )
    // only the library is wanted; the full tree also builds tools and tests
    .with_subdirs(["include", "src/libFLAC"])
}

fn lame() -> Recipe {
    Recipe::new(
        ["https://downloads.sourceforge.net/project/lame/lame/3.100/lame-3.100.tar.gz"],
        "ddfe36cab873794038ae2c1210557ad34857a4b6bdc515785d1da9e175b1da1e",
        "lib/libmp3lame.a",
        BuildKind::Autotools(AutotoolsConfig::new().args([
            "--disable-shared",
            "--enable-static",
            "--disable-gtktest",
            "--disable-analyzer-hooks",
            "--disable-decoder",
            "--disable-frontend",
        ])),
    )
}

fn libid3tag() -> Recipe {
    Recipe::new(
        ["https://downloads.sourceforge.net/project/mad/libid3tag/0.15.1b/libid3tag-0.15.1b.tar.gz"],
        // upstream only ever published an MD5 for this release
        "e5808ad997ba32c498803822078748c3",
        "lib/libid3tag.a",
        BuildKind::Autotools(
            AutotoolsConfig::new()
                .args(["--disable-shared", "--enable-static", "--disable-debugging"])
                .autogen(),
        ),
    )
    // the 2004-era configure.ac uses a macro that newer autoconf rejects
    .with_edit("configure.ac", |s| {
        s.replace("AM_CONFIG_HEADER", "AC_CONFIG_HEADERS")
    })
}

fn libexpat() -> Recipe {
    Recipe::new(
        ["https://github.com/libexpat/libexpat/releases/download/R_2_6_2/expat-2.6.2.tar.xz"],
        "ee14b4c5d8908b1bec37ad937607eab183d4d9806a08adee472c3c3121d27364",
        "lib/libexpat.a",
        BuildKind::Autotools(AutotoolsConfig::new().args([
            "--disable-shared",
            "--enable-static",
            "--without-docbook",
            "--without-examples",
            "--without-tests",
        ])),
    )
}

fn libcurl() -> Recipe {
    Recipe::new(
        ["https://curl.se/download/curl-8.7.1.tar.xz"],
        "6fea2aac6a4610fbd0400afb0bcddbe7258a64c63f1f68e5855ebc0c659710cd",
        "lib/libcurl.a",
        BuildKind::Autotools(AutotoolsConfig::new().args([
            "--disable-shared",
            "--enable-static",
            "--disable-debug",
            "--enable-http",
            "--enable-ipv6",
            "--disable-ftp",
            "--disable-file",
            "--disable-ldap",
            "--disable-ldaps",
            "--disable-rtsp",
            "--disable-proxy",
            "--disable-dict",
            "--disable-telnet",
            "--disable-tftp",
            "--disable-pop3",
            "--disable-imap",
            "--disable-smb",
            "--disable-smtp",
            "--disable-gopher",
            "--disable-manual",
            "--disable-threaded-resolver",
            "--disable-verbose",
            "--disable-sspi",
            "--disable-ntlm-wb",
            "--disable-tls-srp",
            "--disable-cookies",
            "--without-ssl",
            "--without-gnutls",
            "--without-nghttp2",
            "--without-libidn2",
            "--without-brotli",
            "--without-zstd",
            "--with-zlib",
        ])),
    )
}

fn libmpdclient() -> Recipe {
    Recipe::new(
        ["https://www.musicpd.org/download/libmpdclient/2/libmpdclient-2.22.tar.xz"],
        "eac15b82b5ba5ed0648af580221eb74657394f7fe768e966d9e9ebb27435429e",
        "lib/libmpdclient.a",
        BuildKind::Meson(MesonConfig::new().option("documentation", "false")),
    )
}
