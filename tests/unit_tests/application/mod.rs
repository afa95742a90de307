mod scenario_resolver_test;
