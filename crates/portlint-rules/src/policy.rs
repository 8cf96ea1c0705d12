//! Ports tree conventions the checks compare against.

/// Official port categories.
pub const PORT_CATEGORIES: &[&str] = &[
    "accessibility",
    "afterstep",
    "arabic",
    "archivers",
    "astro",
    "audio",
    "benchmarks",
    "biology",
    "cad",
    "chinese",
    "comms",
    "converters",
    "databases",
    "deskutils",
    "devel",
    "dns",
    "docs",
    "editors",
    "education",
    "elisp",
    "emulators",
    "enlightenment",
    "finance",
    "french",
    "ftp",
    "games",
    "geography",
    "german",
    "gnome",
    "gnustep",
    "graphics",
    "hamradio",
    "haskell",
    "hebrew",
    "hungarian",
    "irc",
    "japanese",
    "java",
    "kde",
    "kde-applications",
    "kde-frameworks",
    "kde-plasma",
    "kld",
    "korean",
    "lang",
    "linux",
    "lisp",
    "mail",
    "mate",
    "math",
    "mbone",
    "misc",
    "multimedia",
    "net",
    "net-im",
    "net-mgmt",
    "net-p2p",
    "net-vpn",
    "news",
    "parallel",
    "pear",
    "perl5",
    "plan9",
    "polish",
    "ports-mgmt",
    "portuguese",
    "print",
    "python",
    "ruby",
    "rubygems",
    "russian",
    "scheme",
    "science",
    "security",
    "shells",
    "spanish",
    "sysutils",
    "tcl",
    "textproc",
    "tk",
    "ukrainian",
    "vietnamese",
    "wayland",
    "windowmaker",
    "www",
    "x11",
    "x11-clocks",
    "x11-drivers",
    "x11-fm",
    "x11-fonts",
    "x11-servers",
    "x11-themes",
    "x11-toolkits",
    "x11-wm",
    "xfce",
    "zope",
];

/// Default installation prefix.
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Returns true if `category` is an official category.
#[must_use]
pub fn is_official_category(category: &str) -> bool {
    PORT_CATEGORIES.binary_search(&category).is_ok()
}

/// Compares the index maintainer with the Makefile `MAINTAINER`.
///
/// Exact match. Case-insensitive comparison is planned upstream, and this is
/// the only place to change when it lands.
#[must_use]
pub fn maintainers_match(index: &str, makefile: &str) -> bool {
    index == makefile
}

/// Returns true if `prefix` is a customary installation prefix for `name`.
#[must_use]
pub fn is_conventional_prefix(name: &str, prefix: &str) -> bool {
    match prefix {
        DEFAULT_PREFIX => true,
        "/compat/linux" => name.starts_with("linux"),
        "/usr/local/FreeBSD_ARM64" => name.contains("-aarch64-"),
        "/var/qmail" => name.contains("qmail") || name.starts_with("queue-fix"),
        "/usr" => name.starts_with("global-tz-") || name.starts_with("zoneinfo-"),
        _ => prefix.starts_with("/usr/local/android") && name.contains("droid"),
    }
}
