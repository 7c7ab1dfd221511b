mod greet_tests;
