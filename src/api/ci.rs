/// Environment variables set by common CI providers.
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_ID",
    "BUILD_NUMBER",
    "TEAMCITY_VERSION",
    "TRAVIS",
    "CIRCLECI",
    "JENKINS_URL",
    "HUDSON_URL",
    "bamboo.buildKey",
    "PHPCI",
    "GOCD_SERVER_HOST",
    "BUILDKITE",
    "TF_BUILD",
    "SYSTEM_TEAMFOUNDATIONSERVERURI",
];

/// Returns true when running under a CI provider.
pub fn is_ci() -> bool {
    detect_ci(|key| std::env::var_os(key).is_some())
}

fn detect_ci(is_set: impl Fn(&str) -> bool) -> bool {
    CI_ENV_VARS.iter().any(|key| is_set(key))
}
